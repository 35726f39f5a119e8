//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bazaar_cache::CacheError;
use bazaar_commerce::{CommerceError, FieldErrors};
use serde::Serialize;

use crate::uploads::UploadError;

/// An error rendered as `{"error": {"code", "message", "fields"?}}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Option<FieldErrors>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: None,
        }
    }

    /// Failures the client can't act on. The detail is logged, not returned.
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!("Internal error: {}", detail);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Not found: {}", msg);
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Bad request: {}", msg);
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Conflict: {}", msg);
        Self::new(StatusCode::CONFLICT, "CONFLICT", msg)
    }

    pub fn validation(fields: FieldErrors) -> Self {
        tracing::debug!(%fields, "Validation failed");
        let mut err = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_FAILED",
            "One or more fields are invalid",
        );
        err.fields = Some(fields);
        err
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.code,
                message: &self.message,
                fields: self.fields.as_ref(),
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CommerceError> for ApiError {
    fn from(err: CommerceError) -> Self {
        match err {
            CommerceError::ProductNotFound(_)
            | CommerceError::OrderNotFound(_)
            | CommerceError::LineIndexOutOfRange { .. } => ApiError::not_found(err.to_string()),
            CommerceError::Validation(fields) => ApiError::validation(fields),
            CommerceError::ConstraintViolation(msg) => ApiError::conflict(msg),
            CommerceError::Overflow => ApiError::bad_request(err.to_string()),
            CommerceError::DatabaseError(_) | CommerceError::SerializationError(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        ApiError::internal(format!("session store: {err}"))
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotAllowed(_) => {
                let mut fields = FieldErrors::new();
                fields.add("image", "Images only!");
                ApiError::validation(fields)
            }
            other => ApiError::internal(format!("image upload: {other}")),
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
