//! The uniform error envelope plus the handler-facing error wrapper.
//!
//! Every failure path — malformed input, missing entities, conflicts,
//! internal faults — renders the same `{error: {code, message, errors}}`
//! JSON shape regardless of endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::services::backend::StorageError;

/// Body of the error envelope.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    pub errors: Vec<ErrorDetail>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ErrorDetail {
    pub domain: String,
    pub reason: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn global(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            domain: "global".into(),
            reason: reason.into(),
            message: message.into(),
        }
    }
}

/// The single envelope constructor; `errors` may be empty.
pub fn error_response(
    code: StatusCode,
    message: impl Into<String>,
    errors: Vec<ErrorDetail>,
) -> ErrorResponse {
    ErrorResponse {
        error: ErrorBody {
            code: code.as_u16(),
            message: message.into(),
            errors,
        },
    }
}

/// A failure carried through handlers, keeping the status and message
/// local until the envelope is rendered.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<ErrorDetail>,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.details.push(detail);
        self
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(error_response(self.status, self.message, self.details));
        (self.status, body).into_response()
    }
}

/// Backend taxonomy to HTTP status policy: NotFound → 404, Conflict → 409,
/// InvalidArgument → 400, Internal → 500.
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        let (status, reason) = match err {
            StorageError::BucketNotFound(_) | StorageError::ObjectNotFound { .. } => {
                (StatusCode::NOT_FOUND, "notFound")
            }
            StorageError::BucketConflict { .. } => (StatusCode::CONFLICT, "conflict"),
            StorageError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid"),
            StorageError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        ApiError::new(status, message.clone()).with_detail(ErrorDetail::global(reason, message))
    }
}
