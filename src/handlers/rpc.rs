//! RPC over HTTP: `GET` for queries, `POST` for mutations, optional batching.
//!
//! Single call:  `GET /api/trpc/hello.greet?input={"text":"x"}`
//! Batched call: `GET /api/trpc/health,auth.me?batch=1&input={"0":null,"1":null}`

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::handlers::http::AppState;
use crate::rpc::{format_error, ErrorShape, ProcedureKind, RequestContext, RpcError, RpcResult};

/// Most calls accepted in one batched request.
pub const MAX_BATCH_SIZE: usize = 32;

#[derive(Debug, Default, Deserialize)]
pub struct RpcParams {
    pub batch: Option<String>,
    pub input: Option<String>,
}

impl RpcParams {
    fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessData {
    pub data: Value,
}

/// Per-call response body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success { result: SuccessData },
    Failure { error: ErrorShape },
}

/// GET /api/trpc/:path
pub async fn rpc_query(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<RpcParams>,
    ctx: RequestContext,
) -> Response {
    let input = match params.input.as_deref() {
        Some(raw) => serde_json::from_str(raw).map_err(|e| e.to_string()),
        None => Ok(Value::Null),
    };
    dispatch(&state, ProcedureKind::Query, &path, params.is_batch(), input, ctx).await
}

/// POST /api/trpc/:path
pub async fn rpc_mutation(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<RpcParams>,
    ctx: RequestContext,
    body: Bytes,
) -> Response {
    let input = if body.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_slice(&body).map_err(|e| e.to_string())
    };
    dispatch(&state, ProcedureKind::Mutation, &path, params.is_batch(), input, ctx).await
}

async fn dispatch(
    state: &AppState,
    kind: ProcedureKind,
    path: &str,
    batch: bool,
    input: Result<Value, String>,
    ctx: RequestContext,
) -> Response {
    if !batch {
        let result = match input {
            Ok(input) => call(state, kind, path, ctx, input).await,
            Err(msg) => Err(RpcError::parse_error(msg)),
        };
        let (status, envelope) = envelope(path, result);
        return (status, Json(envelope)).into_response();
    }

    let paths: Vec<&str> = path.split(',').collect();
    if paths.len() > MAX_BATCH_SIZE {
        debug!(size = paths.len(), "rejected oversized batch");
        let err = RpcError::bad_request(format!(
            "Batch of {} calls exceeds the limit of {}",
            paths.len(),
            MAX_BATCH_SIZE
        ));
        let (status, envelope) = envelope(path, Err(err));
        return (status, Json(envelope)).into_response();
    }
    let inputs = split_batch_input(input, paths.len());
    let calls = paths
        .iter()
        .zip(inputs)
        .map(|(path, input)| {
            let ctx = ctx.clone();
            async move {
                let result = match input {
                    Ok(input) => call(state, kind, path, ctx, input).await,
                    Err(msg) => Err(RpcError::parse_error(msg)),
                };
                envelope(path, result)
            }
        });
    let results = join_all(calls).await;

    let status = batch_status(results.iter().map(|(status, _)| *status));
    let body: Vec<Envelope> = results.into_iter().map(|(_, envelope)| envelope).collect();
    (status, Json(body)).into_response()
}

async fn call(
    state: &AppState,
    kind: ProcedureKind,
    path: &str,
    ctx: RequestContext,
    input: Value,
) -> RpcResult<Value> {
    debug!(path = %path, kind = %kind, user_id = ?ctx.user_id(), "rpc call");
    state.router().call(path, kind, ctx, input).await
}

/// Batch input is an object keyed by call index; absent entries mean no input.
fn split_batch_input(input: Result<Value, String>, len: usize) -> Vec<Result<Value, String>> {
    match input {
        Ok(Value::Null) => (0..len).map(|_| Ok(Value::Null)).collect(),
        Ok(Value::Object(mut by_index)) => (0..len)
            .map(|i| Ok(by_index.remove(&i.to_string()).unwrap_or(Value::Null)))
            .collect(),
        Ok(_) => (0..len)
            .map(|_| Err("batch input must be an object keyed by call index".to_string()))
            .collect(),
        Err(msg) => (0..len).map(|_| Err(msg.clone())).collect(),
    }
}

fn envelope(path: &str, result: RpcResult<Value>) -> (StatusCode, Envelope) {
    match result {
        Ok(data) => (
            StatusCode::OK,
            Envelope::Success {
                result: SuccessData { data },
            },
        ),
        Err(err) => (
            err.code.http_status(),
            Envelope::Failure {
                error: format_error(&err, Some(path)),
            },
        ),
    }
}

/// The shared status when every call agrees, else `207 Multi-Status`.
fn batch_status(mut statuses: impl Iterator<Item = StatusCode>) -> StatusCode {
    let Some(first) = statuses.next() else {
        return StatusCode::OK;
    };
    if statuses.all(|s| s == first) {
        first
    } else {
        StatusCode::MULTI_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batch_status_agrees_or_is_multi_status() {
        assert_eq!(
            batch_status([StatusCode::OK, StatusCode::OK].into_iter()),
            StatusCode::OK
        );
        assert_eq!(
            batch_status([StatusCode::UNAUTHORIZED].into_iter()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            batch_status([StatusCode::OK, StatusCode::UNAUTHORIZED].into_iter()),
            StatusCode::MULTI_STATUS
        );
    }

    #[test]
    fn split_batch_input_by_index() {
        let inputs = split_batch_input(Ok(json!({ "1": { "text": "b" } })), 2);
        assert_eq!(inputs[0], Ok(Value::Null));
        assert_eq!(inputs[1], Ok(json!({ "text": "b" })));
    }

    #[test]
    fn split_batch_input_rejects_non_object() {
        let inputs = split_batch_input(Ok(json!([1, 2])), 2);
        assert!(inputs.iter().all(|i| i.is_err()));
    }

    #[test]
    fn envelope_shapes() {
        let (status, ok) = envelope("health", Ok(json!({ "status": "ok" })));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::to_value(ok).unwrap(),
            json!({ "result": { "data": { "status": "ok" } } })
        );

        let (status, err) = envelope("auth.me", Err(RpcError::unauthorized()));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body = serde_json::to_value(err).unwrap();
        assert_eq!(body["error"]["data"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["data"]["path"], "auth.me");
    }
}
