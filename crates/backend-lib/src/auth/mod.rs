// ============================
// courses-backend-lib/src/auth/mod.rs
// ============================
//! Authentication and ownership authorization.
//!
//! Every protected route goes through [`gate::RequestGate`], which composes
//! credential checks ([`credentials`]), token checks ([`token`]) and the
//! ownership rule ([`ownership`]) into one allow/deny decision. A decision is
//! a `Result<Principal, AppError>`; the deny side carries a [`DenyReason`].

pub mod credentials;
pub mod gate;
pub mod ownership;
pub mod password;
pub mod token;

use std::fmt;

use axum::http::StatusCode;
use courses_common::{AccountId, UserSummary};

pub use credentials::{authenticate_credentials, BasicCredentials};
pub use gate::{GateMode, RequestGate};
pub use ownership::authorize_owner;
pub use password::{HashedPassword, ScryptHasher};
pub use token::{Claims, TokenService};

use crate::records::Account;

/// Internal classification of why a request was refused.
///
/// Only [`DenyReason::Unauthorized`] is distinguishable on the wire; the rest
/// share one 401 response and are told apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    MissingCredentials,
    MissingToken,
    UnknownAccount,
    BadPassword,
    InvalidToken,
    /// Authenticated, but not the owner of the resource
    Unauthorized,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::MissingCredentials => "missing_credentials",
            DenyReason::MissingToken => "missing_token",
            DenyReason::UnknownAccount => "unknown_account",
            DenyReason::BadPassword => "bad_password",
            DenyReason::InvalidToken => "invalid_token",
            DenyReason::Unauthorized => "unauthorized",
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            DenyReason::Unauthorized => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display attributes of a principal whose account has been loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
}

/// The authenticated caller of one request.
///
/// Built from credentials it carries the loaded profile; built from a token
/// it carries the identity alone, and loading the account is an explicit
/// follow-up step ([`RequestGate::resolve_account`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    identity: String,
    profile: Option<Profile>,
}

impl Principal {
    /// A principal known only by the identity bound into a token
    pub fn from_identity(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            profile: None,
        }
    }

    pub fn from_account(account: &Account) -> Self {
        Self {
            identity: account.email.clone(),
            profile: Some(Profile {
                id: account.id,
                first_name: account.first_name.clone(),
                last_name: account.last_name.clone(),
            }),
        }
    }

    /// Normalized email address
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Public summary, available once the profile is loaded
    pub fn summary(&self) -> Option<UserSummary> {
        self.profile.as_ref().map(|p| UserSummary {
            id: p.id,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            email_address: self.identity.clone(),
        })
    }
}

/// Canonical form of an account identity.
///
/// Applied at registration and at every lookup so two spellings of one
/// address can never name two accounts.
pub fn normalize_identity(raw: &str) -> String {
    raw.trim().to_lowercase()
}
