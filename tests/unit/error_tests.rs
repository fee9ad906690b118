// =========================
// tests/unit/error_tests.rs
// =========================
//! Unit tests for the error module
use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use courses_backend_lib::auth::DenyReason;
use courses_backend_lib::error::{AppError, ACCESS_DENIED, UNAUTHORIZED};
use serde_json::Value;
use std::io::{Error as IoError, ErrorKind};

async fn body_of(error: AppError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_app_error_display() {
    let denied = AppError::Denied(DenyReason::BadPassword);
    assert_eq!(denied.to_string(), "Access denied: bad_password");

    let io_error = AppError::Io(IoError::new(ErrorKind::NotFound, "File not found"));
    assert!(io_error.to_string().contains("IO error"));

    let validation = AppError::Validation(vec!["a".into(), "b".into()]);
    assert_eq!(validation.to_string(), "Validation failed: a; b");
}

#[test]
fn test_app_error_status_codes() {
    assert_eq!(
        AppError::Denied(DenyReason::MissingToken).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Denied(DenyReason::Unauthorized).status_code(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AppError::NotFound("course".to_string()).status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::Conflict("taken".to_string()).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::Validation(vec![]).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::Internal("test".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_sanitized_messages_hide_details() {
    assert_eq!(
        AppError::Internal("db password is hunter2".into()).sanitized_message(),
        "An internal server error occurred"
    );
    assert_eq!(
        AppError::Denied(DenyReason::UnknownAccount).sanitized_message(),
        ACCESS_DENIED
    );
    assert_eq!(
        AppError::Denied(DenyReason::Unauthorized).sanitized_message(),
        UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_every_authentication_failure_has_one_body() {
    let reasons = [
        DenyReason::MissingCredentials,
        DenyReason::MissingToken,
        DenyReason::UnknownAccount,
        DenyReason::BadPassword,
        DenyReason::InvalidToken,
    ];

    let (_, expected) = body_of(AppError::Denied(DenyReason::BadPassword)).await;
    assert_eq!(expected["error"]["message"], ACCESS_DENIED);
    assert_eq!(expected["error"]["code"], "AUTH_001");

    for reason in reasons {
        let (status, body) = body_of(reason.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{reason}");
        assert_eq!(body, expected, "{reason}");
    }
}

#[tokio::test]
async fn test_forbidden_body() {
    let (status, body) = body_of(DenyReason::Unauthorized.into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_403");
}

#[tokio::test]
async fn test_validation_body_lists_errors() {
    let errors = vec![
        "Course creation requires title.".to_string(),
        "Course creation requires description.".to_string(),
    ];
    let (status, body) = body_of(AppError::Validation(errors.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
    assert_eq!(body["errors"], serde_json::json!(errors));
}
