//! HTTP handlers: shared state and health.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::SessionService;
use crate::rpc::RpcRouter;

/// Shared application state for the HTTP surface.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub router: Arc<RpcRouter>,
}

impl AppState {
    pub fn new(sessions: SessionService, router: RpcRouter) -> Self {
        Self {
            sessions,
            router: Arc::new(router),
        }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn router(&self) -> &RpcRouter {
        &self.router
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "saasfly-api" })),
    )
}
