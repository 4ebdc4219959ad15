//! Data models shared between the session layer and RPC procedures.

pub mod session;

pub use session::*;
