//! Typed RPC layer for the SaaS application shell.
//!
//! Every call gets a fresh request context derived from the caller's
//! session; protected procedures only run for signed-in callers, and
//! validation failures come back as flattened per-field errors.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routers;
pub mod rpc;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use rpc::{build_context, AuthenticatedContext, RequestContext, RpcRouter};

use axum::routing::get;
use handlers::http;

/// Base path of the RPC endpoint.
pub const RPC_BASE_PATH: &str = "/api/trpc";

/// Build the API router (health, rpc). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/health", get(http::health))
        .route(
            &format!("{}/:path", RPC_BASE_PATH),
            get(handlers::rpc_query).post(handlers::rpc_mutation),
        )
        .with_state(state)
}
