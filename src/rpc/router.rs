//! Procedure registry keyed by dotted path.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::context::RequestContext;
use super::error::{RpcError, RpcResult};
use super::procedure::Procedure;

/// Whether a procedure reads (`query`) or writes (`mutation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureKind::Query => f.write_str("query"),
            ProcedureKind::Mutation => f.write_str("mutation"),
        }
    }
}

#[derive(Clone)]
struct Route {
    kind: ProcedureKind,
    procedure: Arc<dyn Procedure<RequestContext>>,
}

/// Immutable once built; shared across calls behind an `Arc`.
#[derive(Clone, Default)]
pub struct RpcRouter {
    routes: BTreeMap<String, Route>,
}

impl RpcRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query<P>(self, path: &str, procedure: P) -> Self
    where
        P: Procedure<RequestContext> + 'static,
    {
        self.route(path, ProcedureKind::Query, Arc::new(procedure))
    }

    pub fn mutation<P>(self, path: &str, procedure: P) -> Self
    where
        P: Procedure<RequestContext> + 'static,
    {
        self.route(path, ProcedureKind::Mutation, Arc::new(procedure))
    }

    /// Mount every procedure of `other` under `prefix.`.
    pub fn nest(mut self, prefix: &str, other: RpcRouter) -> Self {
        for (path, route) in other.routes {
            self = self.route(
                &format!("{}.{}", prefix, path),
                route.kind,
                route.procedure,
            );
        }
        self
    }

    /// Merge the procedures of `other` at their current paths.
    pub fn merge(mut self, other: RpcRouter) -> Self {
        for (path, route) in other.routes {
            self = self.route(&path, route.kind, route.procedure);
        }
        self
    }

    fn route(
        mut self,
        path: &str,
        kind: ProcedureKind,
        procedure: Arc<dyn Procedure<RequestContext>>,
    ) -> Self {
        if self
            .routes
            .insert(path.to_string(), Route { kind, procedure })
            .is_some()
        {
            warn!(path = %path, "procedure path registered twice; keeping the latest");
        }
        self
    }

    pub fn kind(&self, path: &str) -> Option<ProcedureKind> {
        self.routes.get(path).map(|r| r.kind)
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    /// Invoke the procedure at `path` as a `kind` call.
    pub async fn call(
        &self,
        path: &str,
        kind: ProcedureKind,
        ctx: RequestContext,
        input: Value,
    ) -> RpcResult<Value> {
        let route = self.routes.get(path).ok_or_else(|| RpcError::not_found(path))?;
        if route.kind != kind {
            return Err(RpcError::method_not_supported(format!(
                "Unsupported {} call to {} procedure \"{}\"",
                kind, route.kind, path
            )));
        }
        route.procedure.invoke(ctx, input).await
    }
}
