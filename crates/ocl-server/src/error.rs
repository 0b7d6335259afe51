//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes. Field-level validation failures carry
//! their message map in `error.details`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ocl_core::FieldErrors;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_FAILED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Field-keyed validation messages, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Submitted data failed validation, or the request conflicts with the
    /// resource's state (400 with field errors).
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Caller lacks the required permission (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The parent resource of a write could not be resolved (405).
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ApiErrorDetail {
        let (code, message, details) = match self {
            ApiError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None),
            ApiError::Validation(errors) => (
                "VALIDATION_FAILED",
                format!("{} validation error(s)", errors.len()),
                serde_json::to_value(errors).ok(),
            ),
            ApiError::Forbidden(msg) => ("FORBIDDEN", msg.clone(), None),
            ApiError::MethodNotAllowed(msg) => ("METHOD_NOT_ALLOWED", msg.clone(), None),
            ApiError::InternalError(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };
        ApiErrorDetail {
            code: code.to_string(),
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(msg) = &self {
            tracing::error!(error = %msg, "request failed");
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.detail(),
        });

        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<ocl_core::CoreError> for ApiError {
    fn from(err: ocl_core::CoreError) -> Self {
        match err {
            ocl_core::CoreError::UnknownOwnerKind(_) => ApiError::NotFound(err.to_string()),
            ocl_core::CoreError::Validation(errors) => ApiError::Validation(errors),
            ocl_core::CoreError::UnknownOwnerType(_)
            | ocl_core::CoreError::UnknownAccessLevel(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ocl_storage::StorageError> for ApiError {
    fn from(err: ocl_storage::StorageError) -> Self {
        match &err {
            ocl_storage::StorageError::SourceNotFound(_)
            | ocl_storage::StorageError::VersionNotFound(_) => ApiError::NotFound(err.to_string()),
            ocl_storage::StorageError::DuplicateSource { mnemonic, .. } => {
                ApiError::Validation(FieldErrors::single(
                    "id",
                    format!("Source with mnemonic '{}' already exists for this owner.", mnemonic),
                ))
            }
            ocl_storage::StorageError::DuplicateVersion { mnemonic, .. } => {
                ApiError::Validation(FieldErrors::single(
                    "id",
                    format!("Version with mnemonic '{}' already exists for this source.", mnemonic),
                ))
            }
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}
