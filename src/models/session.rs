//! Session and user shapes handed over by the session layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed-in user as exposed to the RPC layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            image: None,
        }
    }
}

/// A resolved session. `user` is `None` when the token carries no subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub expires: DateTime<Utc>,
}

impl Session {
    pub fn new(user: Option<User>, expires: DateTime<Utc>) -> Self {
        Self { user, expires }
    }

    /// Identifier of the signed-in user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}
