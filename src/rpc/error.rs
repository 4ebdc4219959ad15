//! RPC error taxonomy and the error formatter applied to every failed call.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;
use tracing::error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Key under which struct-level validation errors are reported.
const FORM_LEVEL_KEY: &str = "__all__";

/// Error codes understood by typed RPC clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcErrorCode {
    ParseError,
    BadRequest,
    InternalServerError,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotSupported,
    Timeout,
    Conflict,
    TooManyRequests,
}

impl RpcErrorCode {
    /// JSON-RPC 2.0 style numeric code.
    pub fn json_rpc_code(self) -> i32 {
        match self {
            RpcErrorCode::ParseError => -32700,
            RpcErrorCode::BadRequest => -32600,
            RpcErrorCode::InternalServerError => -32603,
            RpcErrorCode::Unauthorized => -32001,
            RpcErrorCode::Forbidden => -32003,
            RpcErrorCode::NotFound => -32004,
            RpcErrorCode::MethodNotSupported => -32005,
            RpcErrorCode::Timeout => -32008,
            RpcErrorCode::Conflict => -32009,
            RpcErrorCode::TooManyRequests => -32029,
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            RpcErrorCode::ParseError | RpcErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            RpcErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            RpcErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            RpcErrorCode::Forbidden => StatusCode::FORBIDDEN,
            RpcErrorCode::NotFound => StatusCode::NOT_FOUND,
            RpcErrorCode::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            RpcErrorCode::Timeout => StatusCode::REQUEST_TIMEOUT,
            RpcErrorCode::Conflict => StatusCode::CONFLICT,
            RpcErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RpcErrorCode::ParseError => "PARSE_ERROR",
            RpcErrorCode::BadRequest => "BAD_REQUEST",
            RpcErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            RpcErrorCode::Unauthorized => "UNAUTHORIZED",
            RpcErrorCode::Forbidden => "FORBIDDEN",
            RpcErrorCode::NotFound => "NOT_FOUND",
            RpcErrorCode::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            RpcErrorCode::Timeout => "TIMEOUT",
            RpcErrorCode::Conflict => "CONFLICT",
            RpcErrorCode::TooManyRequests => "TOO_MANY_REQUESTS",
        }
    }
}

impl fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause attached to an [`RpcError`].
#[derive(Debug)]
pub enum ErrorCause {
    /// Structured input validation failure.
    Validation(ValidationErrors),
    Other(anyhow::Error),
}

/// Error returned by a procedure or by the pipeline around it.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: RpcErrorCode,
    pub message: String,
    pub cause: Option<ErrorCause>,
}

impl RpcError {
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: ErrorCause) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(RpcErrorCode::Unauthorized, RpcErrorCode::Unauthorized.as_str())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::BadRequest, message)
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::ParseError, message)
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(
            RpcErrorCode::NotFound,
            format!("No procedure found on path \"{}\"", path),
        )
    }

    pub fn method_not_supported(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::MethodNotSupported, message)
    }

    /// Input failed validation; the structured errors are kept as the cause.
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::new(RpcErrorCode::BadRequest, errors.to_string())
            .with_cause(ErrorCause::Validation(errors))
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        Self::new(RpcErrorCode::InternalServerError, err.to_string())
            .with_cause(ErrorCause::Other(err))
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match &self.cause {
            Some(ErrorCause::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}

pub type RpcResult<T> = Result<T, RpcError>;

/// Validation errors flattened into form-level and per-field messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl From<&ValidationErrors> for FlattenedErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut flat = FlattenedErrors::default();
        for (field, kind) in errors.errors() {
            let field = field.to_string();
            let mut messages = Vec::new();
            collect_messages(kind, &mut messages);
            if field == FORM_LEVEL_KEY {
                flat.form_errors.extend(messages);
            } else {
                flat.field_errors.entry(field).or_default().extend(messages);
            }
        }
        flat
    }
}

// Nested struct and list errors collapse onto their top-level field.
fn collect_messages(kind: &ValidationErrorsKind, out: &mut Vec<String>) {
    match kind {
        ValidationErrorsKind::Field(errors) => out.extend(errors.iter().map(message_of)),
        ValidationErrorsKind::Struct(nested) => {
            for kind in nested.errors().values() {
                collect_messages(kind, out);
            }
        }
        ValidationErrorsKind::List(items) => {
            for nested in items.values() {
                for kind in nested.errors().values() {
                    collect_messages(kind, out);
                }
            }
        }
    }
}

fn message_of(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("invalid value ({})", error.code),
    }
}

/// Error payload sent to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorShape {
    pub message: String,
    pub code: i32,
    pub data: ErrorShapeData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorShapeData {
    pub code: RpcErrorCode,
    pub http_status: u16,
    pub path: Option<String>,
    /// Flattened input validation errors. The wire name is what existing clients read.
    pub zod_error: Option<FlattenedErrors>,
}

/// Default shape for `err`, without any validation details.
pub fn default_shape(err: &RpcError, path: Option<&str>) -> ErrorShape {
    ErrorShape {
        message: err.message.clone(),
        code: err.code.json_rpc_code(),
        data: ErrorShapeData {
            code: err.code,
            http_status: err.code.http_status().as_u16(),
            path: path.map(str::to_string),
            zod_error: None,
        },
    }
}

/// Format `err` for the client: the default shape plus the flattened
/// validation errors when the cause is a validation failure.
pub fn format_error(err: &RpcError, path: Option<&str>) -> ErrorShape {
    if err.code == RpcErrorCode::InternalServerError {
        error!(path = path.unwrap_or("<none>"), error = ?err, "rpc call failed");
    }
    let mut shape = default_shape(err, path);
    shape.data.zod_error = err.validation_errors().map(FlattenedErrors::from);
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::{Validate, ValidationError};

    #[derive(Debug, Validate)]
    struct SignUp {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(email(message = "Invalid email"))]
        email: String,
        #[validate(nested)]
        address: Address,
    }

    #[derive(Debug, Validate)]
    struct Address {
        #[validate(length(min = 2, message = "City is too short"))]
        city: String,
    }

    fn invalid_sign_up() -> ValidationErrors {
        SignUp {
            name: String::new(),
            email: "nope".to_string(),
            address: Address {
                city: "x".to_string(),
            },
        }
        .validate()
        .unwrap_err()
    }

    #[derive(Debug, Validate)]
    #[validate(schema(function = "passwords_match"))]
    struct ChangePassword {
        password: String,
        confirm: String,
    }

    fn passwords_match(input: &ChangePassword) -> Result<(), ValidationError> {
        if input.password == input.confirm {
            return Ok(());
        }
        let mut err = ValidationError::new("passwords_match");
        err.message = Some("Passwords must match".into());
        Err(err)
    }

    #[derive(Debug, Validate)]
    struct Invite {
        #[validate(nested)]
        members: Vec<Address>,
    }

    #[test]
    fn codes_map_to_http_status() {
        assert_eq!(RpcErrorCode::Unauthorized.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(RpcErrorCode::BadRequest.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RpcErrorCode::MethodNotSupported.http_status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(RpcErrorCode::Unauthorized.json_rpc_code(), -32001);
    }

    #[test]
    fn flatten_groups_messages_by_top_level_field() {
        let flat = FlattenedErrors::from(&invalid_sign_up());
        assert!(flat.form_errors.is_empty());
        assert_eq!(flat.field_errors["name"], vec!["Name is required".to_string()]);
        assert_eq!(flat.field_errors["email"], vec!["Invalid email".to_string()]);
        assert_eq!(flat.field_errors["address"], vec!["City is too short".to_string()]);
    }

    #[test]
    fn struct_level_errors_become_form_errors() {
        let errors = ChangePassword {
            password: "hunter22".to_string(),
            confirm: "hunter23".to_string(),
        }
        .validate()
        .unwrap_err();
        let flat = FlattenedErrors::from(&errors);
        assert_eq!(flat.form_errors, vec!["Passwords must match".to_string()]);
        assert!(!flat.field_errors.contains_key(FORM_LEVEL_KEY));
        assert!(flat.field_errors.is_empty());
    }

    #[test]
    fn list_errors_collapse_onto_top_level_field() {
        let errors = Invite {
            members: vec![
                Address {
                    city: "Oslo".to_string(),
                },
                Address {
                    city: "x".to_string(),
                },
            ],
        }
        .validate()
        .unwrap_err();
        let flat = FlattenedErrors::from(&errors);
        assert!(flat.form_errors.is_empty());
        assert_eq!(flat.field_errors.len(), 1);
        assert_eq!(flat.field_errors["members"], vec!["City is too short".to_string()]);
    }

    #[test]
    fn validation_cause_yields_field_map() {
        let err = RpcError::validation(invalid_sign_up());
        let shape = serde_json::to_value(format_error(&err, Some("user.signUp"))).unwrap();
        assert_eq!(shape["code"], -32600);
        assert_eq!(shape["data"]["code"], "BAD_REQUEST");
        assert_eq!(shape["data"]["httpStatus"], 400);
        assert_eq!(shape["data"]["path"], "user.signUp");
        assert_eq!(
            shape["data"]["zodError"]["fieldErrors"]["name"],
            json!(["Name is required"])
        );
        assert_eq!(shape["data"]["zodError"]["formErrors"], json!([]));
    }

    #[test]
    fn other_errors_have_null_field_map() {
        for err in [
            RpcError::unauthorized(),
            RpcError::bad_request("bad input"),
            RpcError::internal(anyhow::anyhow!("db down")),
        ] {
            let shape = serde_json::to_value(format_error(&err, None)).unwrap();
            assert!(shape["data"]["zodError"].is_null(), "{}", err);
        }
    }

    #[test]
    fn unauthorized_shape() {
        let shape = format_error(&RpcError::unauthorized(), Some("auth.me"));
        assert_eq!(shape.message, "UNAUTHORIZED");
        assert_eq!(shape.data.code, RpcErrorCode::Unauthorized);
        assert_eq!(shape.data.http_status, 401);
    }
}
