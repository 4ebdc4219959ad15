//! Typed RPC layer: per-call context, procedures, routing and error shapes.

pub mod context;
pub mod error;
pub mod procedure;
pub mod router;

pub use context::{build_context, AuthenticatedContext, RequestContext};
pub use error::{
    default_shape, format_error, ErrorCause, ErrorShape, FlattenedErrors, RpcError, RpcErrorCode,
    RpcResult,
};
pub use procedure::{handler, parse_input, Handler, NoInput, Procedure};
pub use router::{ProcedureKind, RpcRouter};
