//! Public greeting procedure.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::public;
use crate::rpc::{RequestContext, RpcResult, RpcRouter};

#[derive(Debug, Deserialize, Validate)]
pub struct GreetInput {
    #[validate(length(min = 1, max = 64, message = "Text must be 1 to 64 characters"))]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct Greeting {
    pub greeting: String,
}

async fn greet(_ctx: RequestContext, input: GreetInput) -> RpcResult<Greeting> {
    Ok(Greeting {
        greeting: format!("Hello {}", input.text),
    })
}

pub fn router() -> RpcRouter {
    RpcRouter::new().query("greet", public(greet))
}
