// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request body validation.
//!
//! Each check collects every failing field so the client sees all problems
//! in one 400 response.

use courses_common::{CourseInput, NewUser};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::AppError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Which course operation is being validated; only changes the messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseAction {
    Creation,
    Update,
}

impl CourseAction {
    fn as_str(self) -> &'static str {
        match self {
            CourseAction::Creation => "creation",
            CourseAction::Update => "update",
        }
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Check if an email address is well formed
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email.trim())
}

/// Validate a registration payload
pub fn validate_new_user(user: &NewUser) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if !present(&user.first_name) {
        errors.push("Registration requires a first name.".to_string());
    }
    if !present(&user.last_name) {
        errors.push("Registration requires a last name.".to_string());
    }
    match user.email_address.as_deref() {
        Some(email) if !email.trim().is_empty() => {
            if !is_valid_email(email) {
                errors.push("Enter a valid email address.".to_string());
            }
        },
        _ => errors.push("Registration requires an email address.".to_string()),
    }
    if user.password.as_deref().map_or(true, str::is_empty) {
        errors.push("Registration requires a password.".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Validate a course payload; title and description are required
pub fn validate_course(course: &CourseInput, action: CourseAction) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if !present(&course.title) {
        errors.push(format!("Course {} requires title.", action.as_str()));
    }
    if !present(&course.description) {
        errors.push(format!("Course {} requires description.", action.as_str()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
