// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::DenyReason;

/// Body shown for every authentication failure, whatever the reason
pub const ACCESS_DENIED: &str = "Access Denied";

/// Body shown when a known principal does not own the resource
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Access denied: {0}")]
    Denied(DenyReason),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Denied(reason) => reason.status_code(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Denied(DenyReason::Unauthorized) => "AUTH_403",
            AppError::Denied(_) => "AUTH_001",
            AppError::Internal(_) => "INT_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::Validation(_) => "VAL_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Denied(DenyReason::Unauthorized) => UNAUTHORIZED.to_string(),
            AppError::Denied(_) => ACCESS_DENIED.to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            AppError::Io(_) | AppError::Json(_) => "Internal server error".to_string(),
            AppError::NotFound(_) => "Not Found".to_string(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Validation(_) => "Invalid input provided".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Deny reasons stay server-side in every build so that a bad password
        // and an unknown account look the same on the wire.
        let message = if cfg!(debug_assertions) && !matches!(self, AppError::Denied(_)) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = match &self {
            AppError::Validation(errors) => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                },
                "errors": errors,
            }),
            _ => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, axum::Json(body)).into_response()
    }
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        AppError::Denied(reason)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {err}"))
    }
}
