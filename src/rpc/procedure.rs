//! Procedure interface and the typed handler adapter.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use super::error::{RpcError, RpcResult};

/// A server-side operation invocable with a context of type `C`.
#[async_trait]
pub trait Procedure<C>: Send + Sync {
    async fn invoke(&self, ctx: C, input: Value) -> RpcResult<Value>;
}

/// Input type for procedures that take no input. Any JSON object (or no
/// input at all) is accepted.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct NoInput {}

impl Validate for NoInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Typed procedure backed by an async function.
///
/// Input is deserialized into `I` and validated before `f` runs; the output
/// is serialized back to JSON.
pub struct Handler<F, I> {
    f: F,
    _input: PhantomData<fn() -> I>,
}

pub fn handler<C, I, O, F, Fut>(f: F) -> Handler<F, I>
where
    F: Fn(C, I) -> Fut + Send + Sync,
    Fut: Future<Output = RpcResult<O>> + Send,
    I: DeserializeOwned + Validate,
    O: Serialize,
{
    Handler {
        f,
        _input: PhantomData,
    }
}

#[async_trait]
impl<C, I, O, F, Fut> Procedure<C> for Handler<F, I>
where
    C: Send + 'static,
    I: DeserializeOwned + Validate + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(C, I) -> Fut + Send + Sync,
    Fut: Future<Output = RpcResult<O>> + Send,
{
    async fn invoke(&self, ctx: C, input: Value) -> RpcResult<Value> {
        let input = parse_input::<I>(input)?;
        let output = (self.f)(ctx, input).await?;
        serde_json::to_value(output).map_err(RpcError::internal)
    }
}

/// Deserialize and validate raw input. Missing input (`null`) reads as `{}`.
pub fn parse_input<I>(input: Value) -> RpcResult<I>
where
    I: DeserializeOwned + Validate,
{
    let input = match input {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    let parsed: I = serde_json::from_value(input)
        .map_err(|e| RpcError::bad_request(format!("Invalid input: {}", e)))?;
    parsed.validate().map_err(RpcError::validation)?;
    Ok(parsed)
}
