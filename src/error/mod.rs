//! Application error types for robust error handling.

use thiserror::Error;

use crate::config::ConfigLoadError;

/// Application-level errors (startup and session tokens; RPC calls use `RpcError`).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("Invalid CORS origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("JWT error: {0}")]
    Jwt(String),
}

pub type AppResult<T> = Result<T, AppError>;
