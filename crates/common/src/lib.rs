// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! exchanged between Courses API clients and the server.
//! Every body on the wire is JSON with camelCase field names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal identifier of an account
pub type AccountId = Uuid;

/// Internal identifier of a course
pub type CourseId = Uuid;

/// Registration payload for `POST /api/users`.
///
/// Every field is optional on the wire so that a missing field surfaces as a
/// validation message instead of a deserialization failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

/// Body of a successful `GET /api/users`.
///
/// `token` is only present when the caller authenticated with credentials;
/// token-authenticated reads return the user alone.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token: Option<String>,
}

/// Course payload for `POST /api/courses` and `PUT /api/courses/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}

/// Owner as shown next to a course
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseOwner {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
}

/// Public view of a course with its owner populated
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    /// `None` when the owning account no longer exists
    pub user: Option<CourseOwner>,
}

/// Generic `{ "message": ... }` body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    pub message: String,
}
