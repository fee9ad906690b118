// ============================
// courses-backend-lib/src/auth/credentials.rs
// ============================
//! HTTP Basic credentials and the credential authenticator.
use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroize;

use super::{normalize_identity, token::strip_scheme, DenyReason, Principal, ScryptHasher};
use crate::error::AppError;
use crate::storage::Storage;

/// Identity/secret pair taken from `Authorization: Basic ...`
pub struct BasicCredentials {
    pub identity: String,
    secret: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("identity", &self.identity)
            .field("secret", &"***")
            .finish()
    }
}

impl Drop for BasicCredentials {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl BasicCredentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Parse the `Authorization` header.
    ///
    /// Returns `None` when the header is absent, uses another scheme, is not
    /// valid base64/UTF-8, lacks the `:` separator or names no identity.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let encoded = strip_scheme(value.trim(), "Basic")?;
        let mut decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;

        let parsed = decoded
            .split_once(':')
            .filter(|(identity, _)| !identity.is_empty())
            .map(|(identity, secret)| Self::new(identity, secret));
        decoded.zeroize();
        parsed
    }
}

/// Whether the request carries a Basic authorization header
pub fn has_basic(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| strip_scheme(v.trim(), "Basic"))
        .is_some()
}

/// Authenticate a credential pair against the account store.
///
/// The account lookup completes before the password is compared, and the
/// comparison completes before a principal is produced. An unknown account
/// still pays for one scrypt verification against a decoy hash.
pub async fn authenticate_credentials<S: Storage + ?Sized>(
    storage: &S,
    hasher: &ScryptHasher,
    credentials: BasicCredentials,
) -> Result<Principal, AppError> {
    let identity = normalize_identity(&credentials.identity);
    let account = storage.account_by_email(&identity).await?;

    let hasher = hasher.clone();
    match account {
        None => {
            tokio::task::spawn_blocking(move || hasher.verify_decoy(credentials.secret())).await?;
            Err(DenyReason::UnknownAccount.into())
        },
        Some(account) => {
            let stored = account.password_hash.clone();
            let verified =
                tokio::task::spawn_blocking(move || hasher.verify(credentials.secret(), &stored))
                    .await?;
            if verified {
                Ok(Principal::from_account(&account))
            } else {
                Err(DenyReason::BadPassword.into())
            }
        },
    }
}
