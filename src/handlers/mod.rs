//! HTTP request handlers.

pub mod http;
pub mod rpc;

pub use http::*;
pub use rpc::{rpc_mutation, rpc_query};
