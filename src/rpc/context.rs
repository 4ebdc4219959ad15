//! Per-call context handed to procedures.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::models::Session;

/// Context for procedures on the public surface.
///
/// Built fresh for every call by [`build_context`] and never mutated
/// afterwards. `session` and `headers` are shared, read-only references to
/// what the transport and session layer supplied.
#[derive(Debug, Clone)]
pub struct RequestContext {
    user_id: Option<String>,
    session: Option<Arc<Session>>,
    headers: Arc<HeaderMap>,
}

/// Context for protected procedures: the caller is known.
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    user_id: String,
    session: Option<Arc<Session>>,
    headers: Arc<HeaderMap>,
}

/// Derive the per-call context from the inbound headers and resolved session.
///
/// `user_id` is the session's user id when both the session and its user
/// are present. An empty id counts as absent.
pub fn build_context(headers: Arc<HeaderMap>, session: Option<Arc<Session>>) -> RequestContext {
    let user_id = session
        .as_deref()
        .and_then(Session::user_id)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    RequestContext {
        user_id,
        session,
        headers,
    }
}

impl RequestContext {
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Narrow to an [`AuthenticatedContext`], or hand the context back when
    /// no user id is present.
    pub fn authenticate(self) -> Result<AuthenticatedContext, RequestContext> {
        match self.user_id {
            Some(user_id) => Ok(AuthenticatedContext {
                user_id,
                session: self.session,
                headers: self.headers,
            }),
            None => Err(self),
        }
    }
}

impl AuthenticatedContext {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
