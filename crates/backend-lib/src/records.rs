// ============================
// courses-backend-lib/src/records.rs
// ============================
//! Records as persisted by the storage layer.
use courses_common::{AccountId, CourseId, CourseInput, CourseOwner, CourseView, UserSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{normalize_identity, HashedPassword};

/// A registered user
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    /// Normalized, unique across all accounts
    pub email: String,
    pub password_hash: HashedPassword,
}

impl Account {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: &str,
        password_hash: HashedPassword,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: normalize_identity(email),
            password_hash,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email_address: self.email.clone(),
        }
    }

    pub fn as_owner(&self) -> CourseOwner {
        CourseOwner {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// A course and the account that created it
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub materials_needed: Option<String>,
    /// Set at creation and never changed. A record read back without one is
    /// owned by nobody.
    #[serde(default)]
    pub owner: Option<AccountId>,
}

impl Course {
    /// Build a course from an already validated input
    pub fn new(input: CourseInput, owner: AccountId) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            estimated_time: input.estimated_time,
            materials_needed: input.materials_needed,
            owner: Some(owner),
        }
    }

    /// Apply an already validated update. Optional fields are only replaced
    /// when present; the owner is untouched.
    pub fn apply(&mut self, input: CourseInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        if input.estimated_time.is_some() {
            self.estimated_time = input.estimated_time;
        }
        if input.materials_needed.is_some() {
            self.materials_needed = input.materials_needed;
        }
    }

    pub fn view(&self, owner: Option<&Account>) -> CourseView {
        CourseView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            estimated_time: self.estimated_time.clone(),
            materials_needed: self.materials_needed.clone(),
            user: owner.map(Account::as_owner),
        }
    }
}
