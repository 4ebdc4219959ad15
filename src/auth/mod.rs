//! Authentication: session tokens and session resolution.

mod jwt;
mod service;

pub use jwt::{Claims, SessionTokens};
pub use service::{SessionService, SESSION_COOKIES};
