//! Error responses for the HTTP surface.
//!
//! Every failure is caught at the router boundary and rendered as a JSON
//! object with a single key. The key (`err`, `error` or `message`) is chosen per
//! endpoint to stay compatible with existing clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use thiserror::Error;

use roster_core::DomainError;
use roster_infra::StoreError;

/// Key under which an error message is returned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKey {
    Err,
    Error,
    Message,
}

impl ErrorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKey::Err => "err",
            ErrorKey::Error => "error",
            ErrorKey::Message => "message",
        }
    }
}

/// Error body: one key, one human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub key: ErrorKey,
    pub message: String,
}

impl ErrorBody {
    pub fn new(key: ErrorKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Malformed input (user name type/length).
    #[error("validation error: {}", .0.message)]
    Validation(ErrorBody),

    /// Path parameter failed the numeric-id gate.
    #[error("invalid id: {}", .0.message)]
    InvalidId(ErrorBody),

    #[error("not found: {}", .0.message)]
    NotFound(ErrorBody),

    /// The persistence collaborator failed.
    #[error("persistence error: {}", .0.message)]
    Persistence(ErrorBody),
}

impl ApiError {
    pub fn validation(key: ErrorKey, message: impl Into<String>) -> Self {
        Self::Validation(ErrorBody::new(key, message))
    }

    pub fn invalid_id(key: ErrorKey, message: impl Into<String>) -> Self {
        Self::InvalidId(ErrorBody::new(key, message))
    }

    pub fn not_found(key: ErrorKey, message: impl Into<String>) -> Self {
        Self::NotFound(ErrorBody::new(key, message))
    }

    /// Log the store failure and wrap it in a client-facing message.
    pub fn persistence(err: StoreError, key: ErrorKey, message: impl Into<String>) -> Self {
        tracing::error!(error = %err, "store call failed");
        Self::Persistence(ErrorBody::new(key, message))
    }

    /// Map a domain failure onto the given client-facing body.
    pub fn from_domain(err: DomainError, key: ErrorKey, message: impl Into<String>) -> Self {
        tracing::debug!(error = %err, "request rejected");
        match err {
            DomainError::Validation(_) => Self::validation(key, message),
            DomainError::InvalidId(_) => Self::invalid_id(key, message),
        }
    }

    /// Invalid ids map to 500 rather than 400; existing clients rely on it.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidId(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_body(self) -> ErrorBody {
        match self {
            ApiError::Validation(b)
            | ApiError::InvalidId(b)
            | ApiError::NotFound(b)
            | ApiError::Persistence(b) => b,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let ErrorBody { key, message } = self.into_body();
        json_error(status, key, message)
    }
}

pub fn json_error(status: StatusCode, key: ErrorKey, message: impl Into<String>) -> Response {
    let mut body = Map::new();
    body.insert(key.as_str().to_string(), Value::String(message.into()));
    (status, axum::Json(Value::Object(body))).into_response()
}
