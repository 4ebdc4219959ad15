//! Middleware: context extraction, the authorization gate for procedures,
//! and the CORS policy.

pub mod auth;
pub mod cors;

pub use auth::{protect, protected, public, Protected};
