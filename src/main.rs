//! Entry point: load config, wire dependencies, and run the server.

use saasfly_api::auth::{SessionService, SessionTokens};
use saasfly_api::config::Config;
use saasfly_api::error::AppError;
use saasfly_api::middleware::cors;
use saasfly_api::routers::app_router;
use saasfly_api::{create_app, AppState};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(AppError::from)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tokens = SessionTokens::new(config.auth_secret.clone(), config.session_max_age_days);
    let router = app_router();
    tracing::info!(procedures = ?router.paths(), "rpc router ready");

    let state = AppState::new(SessionService::new(tokens), router);

    let app = create_app(state).layer(TraceLayer::new_for_http());
    let app = cors::apply(app, &config.cors_allowed_origins)?;

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
