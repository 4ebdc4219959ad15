//! Auth middleware: request context extraction and the `protect` gate for
//! procedures that require a signed-in caller.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;
use validator::Validate;

use crate::handlers::http::AppState;
use crate::rpc::{
    build_context, handler, AuthenticatedContext, Handler, Procedure, RequestContext, RpcError,
    RpcResult,
};

/// Extractor: per-call [`RequestContext`] built from the request headers and
/// the session they resolve to. Never rejects; anonymous callers get a
/// context without a user id.
#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.sessions().resolve(&parts.headers).map(Arc::new);
        Ok(build_context(Arc::new(parts.headers.clone()), session))
    }
}

/// A procedure gated on an authenticated caller.
///
/// Each call is evaluated on its own: without a user id the call is
/// rejected with `UNAUTHORIZED` and the inner procedure never runs;
/// otherwise the inner procedure runs once with the narrowed context.
pub struct Protected<P> {
    inner: P,
}

/// Wrap `procedure` so it is only reachable by authenticated callers.
pub fn protect<P>(procedure: P) -> Protected<P>
where
    P: Procedure<AuthenticatedContext>,
{
    Protected { inner: procedure }
}

#[async_trait]
impl<P> Procedure<RequestContext> for Protected<P>
where
    P: Procedure<AuthenticatedContext>,
{
    async fn invoke(&self, ctx: RequestContext, input: Value) -> RpcResult<Value> {
        match ctx.authenticate() {
            Ok(authed) => self.inner.invoke(authed, input).await,
            Err(_) => {
                debug!("rejected protected call: no authenticated user");
                Err(RpcError::unauthorized())
            }
        }
    }
}

/// Procedure open to every caller.
pub fn public<I, O, F, Fut>(f: F) -> Handler<F, I>
where
    F: Fn(RequestContext, I) -> Fut + Send + Sync,
    Fut: Future<Output = RpcResult<O>> + Send,
    I: DeserializeOwned + Validate,
    O: Serialize,
{
    handler(f)
}

/// Procedure that requires a signed-in caller.
pub fn protected<I, O, F, Fut>(f: F) -> Protected<Handler<F, I>>
where
    F: Fn(AuthenticatedContext, I) -> Fut + Send + Sync,
    Fut: Future<Output = RpcResult<O>> + Send,
    I: DeserializeOwned + Validate + Send + 'static,
    O: Serialize + Send + 'static,
{
    protect(handler(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, User};
    use crate::rpc::{NoInput, RpcErrorCode};
    use axum::http::HeaderMap;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Procedure<AuthenticatedContext> for Counting {
        async fn invoke(&self, ctx: AuthenticatedContext, _input: Value) -> RpcResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "userId": ctx.user_id() }))
        }
    }

    fn ctx_for(session: Option<Session>) -> RequestContext {
        build_context(Arc::new(HeaderMap::new()), session.map(Arc::new))
    }

    fn counting() -> (Protected<Counting>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            protect(Counting {
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn signed_in_caller_runs_body_once() {
        let (p, calls) = counting();
        let session = Session::new(Some(User::new("u1")), Utc::now());
        let out = p.invoke(ctx_for(Some(session)), Value::Null).await.unwrap();
        assert_eq!(out, json!({ "userId": "u1" }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_session_is_rejected_before_body() {
        let (p, calls) = counting();
        let err = p.invoke(ctx_for(None), Value::Null).await.unwrap_err();
        assert_eq!(err.code, RpcErrorCode::Unauthorized);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn session_without_user_is_rejected_before_body() {
        let (p, calls) = counting();
        let session = Session::new(None, Utc::now());
        let err = p.invoke(ctx_for(Some(session)), Value::Null).await.unwrap_err();
        assert_eq!(err.code, RpcErrorCode::Unauthorized);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected_before_body() {
        let (p, calls) = counting();
        let session = Session::new(Some(User::new("")), Utc::now());
        let err = p.invoke(ctx_for(Some(session)), Value::Null).await.unwrap_err();
        assert_eq!(err.code, RpcErrorCode::Unauthorized);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_call_is_evaluated_independently() {
        let (p, calls) = counting();
        let signed_in = Session::new(Some(User::new("u1")), Utc::now());
        assert!(p.invoke(ctx_for(None), Value::Null).await.is_err());
        assert!(p.invoke(ctx_for(Some(signed_in)), Value::Null).await.is_ok());
        assert!(p.invoke(ctx_for(None), Value::Null).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unauthenticated_short_circuits_input_validation() {
        let p = protected(|ctx: AuthenticatedContext, _: NoInput| async move {
            Ok::<_, RpcError>(ctx.user_id().to_string())
        });
        let err = p.invoke(ctx_for(None), json!("not an object")).await.unwrap_err();
        assert_eq!(err.code, RpcErrorCode::Unauthorized);
    }
}
