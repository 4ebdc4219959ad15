//! Application configuration loaded from environment.

use std::net::SocketAddr;

const MIN_AUTH_SECRET_LEN: usize = 32;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// Secret for signing and verifying session tokens (min 32 chars).
    pub auth_secret: String,
    /// Lifetime of issued session tokens, in days.
    pub session_max_age_days: i64,
    /// Origins allowed to call the RPC endpoint cross-site. Empty disables CORS.
    pub cors_allowed_origins: Vec<String>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let server_addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let auth_secret = std::env::var("AUTH_SECRET")
            .unwrap_or_else(|_| "saasfly_auth_secret_change_in_production".to_string());
        if auth_secret.len() < MIN_AUTH_SECRET_LEN {
            return Err(ConfigLoadError::ShortAuthSecret);
        }

        let session_max_age_days = match std::env::var("SESSION_MAX_AGE_DAYS") {
            Ok(v) => v
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or(ConfigLoadError::InvalidSessionMaxAge)?,
            Err(_) => 30,
        };

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        );
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            server_addr,
            auth_secret,
            session_max_age_days,
            cors_allowed_origins,
            log_level,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("AUTH_SECRET must be at least {MIN_AUTH_SECRET_LEN} characters")]
    ShortAuthSecret,
    #[error("SESSION_MAX_AGE_DAYS must be a positive integer")]
    InvalidSessionMaxAge,
}
