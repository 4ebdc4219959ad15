//! Application procedures, assembled into the root router.

pub mod auth;
pub mod hello;

use serde::Serialize;

use crate::middleware::public;
use crate::rpc::{NoInput, RequestContext, RpcResult, RpcRouter};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

async fn health(_ctx: RequestContext, _input: NoInput) -> RpcResult<HealthStatus> {
    Ok(HealthStatus { status: "ok" })
}

/// Root router: `health`, `hello.*`, `auth.*`.
pub fn app_router() -> RpcRouter {
    RpcRouter::new()
        .query("health", public(health))
        .nest("hello", hello::router())
        .nest("auth", auth::router())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_router_exposes_all_procedures() {
        assert_eq!(
            app_router().paths(),
            vec![
                "auth.getSession",
                "auth.me",
                "auth.updateName",
                "health",
                "hello.greet"
            ]
        );
    }
}
