// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers. Every handler here runs after the request gate has
//! already allowed the request, or on a public route.

pub mod courses;
pub mod users;

use axum::{http::StatusCode, Json};
use courses_common::MessageBody;

/// `GET /`
pub async fn welcome() -> Json<MessageBody> {
    Json(MessageBody {
        message: "Welcome to the Courses API!".to_string(),
    })
}

/// Fallback for unmatched routes
pub async fn not_found() -> (StatusCode, Json<MessageBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessageBody {
            message: "Route Not Found".to_string(),
        }),
    )
}
