//! Session resolution: inbound headers -> optional session.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;

use crate::auth::SessionTokens;
use crate::models::{Session, User};

/// Cookie names checked for a session token, in order.
pub const SESSION_COOKIES: [&str; 2] = [
    "__Secure-next-auth.session-token",
    "next-auth.session-token",
];

/// Resolves the caller's session from request headers.
///
/// A bearer token takes precedence over session cookies. Anything that does
/// not validate is treated as an anonymous request.
#[derive(Clone)]
pub struct SessionService {
    tokens: SessionTokens,
}

impl SessionService {
    pub fn new(tokens: SessionTokens) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Option<Session> {
        let token = session_token(headers)?;
        match self.tokens.validate(&token) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(error = %e, "ignoring invalid session token");
                None
            }
        }
    }

    pub fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        self.resolve(headers).and_then(|s| s.user)
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    let jar = CookieJar::from_headers(headers);
    SESSION_COOKIES
        .iter()
        .find_map(|name| jar.get(name).map(|c| c.value().to_string()))
}
