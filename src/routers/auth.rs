//! Session procedures: who is calling, and a protected profile update.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::{protected, public};
use crate::models::Session;
use crate::rpc::{AuthenticatedContext, NoInput, RequestContext, RpcResult, RpcRouter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNameInput {
    #[validate(length(min = 1, max = 32, message = "Name must be 1 to 32 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedName {
    pub user_id: String,
    pub name: String,
}

async fn get_session(ctx: RequestContext, _input: NoInput) -> RpcResult<Option<Session>> {
    Ok(ctx.session().cloned())
}

async fn me(ctx: AuthenticatedContext, _input: NoInput) -> RpcResult<Me> {
    let user = ctx.session().and_then(|s| s.user.as_ref());
    Ok(Me {
        user_id: ctx.user_id().to_string(),
        name: user.and_then(|u| u.name.clone()),
        email: user.and_then(|u| u.email.clone()),
        image: user.and_then(|u| u.image.clone()),
    })
}

// Nothing is persisted here; the caller gets back what would be stored.
async fn update_name(ctx: AuthenticatedContext, input: UpdateNameInput) -> RpcResult<UpdatedName> {
    Ok(UpdatedName {
        user_id: ctx.user_id().to_string(),
        name: input.name.trim().to_string(),
    })
}

pub fn router() -> RpcRouter {
    RpcRouter::new()
        .query("getSession", public(get_session))
        .query("me", protected(me))
        .mutation("updateName", protected(update_name))
}
