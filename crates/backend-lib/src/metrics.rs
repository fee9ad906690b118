// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const AUTH_DENIED: &str = "auth.denied";
pub const AUTH_LOGIN: &str = "auth.login";
pub const TOKEN_ISSUED: &str = "token.issued";
pub const ACCOUNT_REGISTERED: &str = "account.registered";
pub const COURSE_CREATED: &str = "course.created";
pub const COURSE_UPDATED: &str = "course.updated";
pub const COURSE_DELETED: &str = "course.deleted";
