//! Session token issue and validation.

use crate::error::{AppError, AppResult};
use crate::models::{Session, User};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>, // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    fn into_session(self) -> AppResult<Session> {
        let expires = DateTime::<Utc>::from_timestamp(self.exp, 0)
            .ok_or_else(|| AppError::Jwt(format!("exp out of range: {}", self.exp)))?;
        let user = self.sub.map(|id| User {
            id,
            name: self.name,
            email: self.email,
            image: self.picture,
        });
        Ok(Session::new(user, expires))
    }
}

/// HS256 session tokens signed with the auth secret.
#[derive(Clone)]
pub struct SessionTokens {
    secret: String,
    max_age: Duration,
}

impl SessionTokens {
    pub fn new(secret: String, max_age_days: i64) -> Self {
        Self {
            secret,
            max_age: Duration::days(max_age_days),
        }
    }

    /// Issue a token for `user`; `None` yields a session without a user.
    pub fn issue(&self, user: Option<&User>) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.map(|u| u.id.clone()),
            name: user.and_then(|u| u.name.clone()),
            email: user.and_then(|u| u.email.clone()),
            picture: user.and_then(|u| u.image.clone()),
            exp: (now + self.max_age).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Jwt(e.to_string()))?;
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> AppResult<Session> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::Jwt(e.to_string()))?;
        data.claims.into_session()
    }
}
