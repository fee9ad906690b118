// ============================
// courses-backend-lib/src/auth/ownership.rs
// ============================
//! Ownership rule for course mutations.
use super::{DenyReason, Principal};
use crate::error::AppError;
use crate::records::{Account, Course};
use crate::storage::Storage;

/// Load the account a principal names.
///
/// Token principals carry only an identity; an account deleted after the
/// token was issued is `UnknownAccount`, whatever the token claimed.
pub async fn resolve_account<S: Storage + ?Sized>(
    storage: &S,
    principal: &Principal,
) -> Result<Account, AppError> {
    storage
        .account_by_email(principal.identity())
        .await?
        .ok_or(AppError::Denied(DenyReason::UnknownAccount))
}

/// Binary ownership decision: the account's internal id must equal the
/// course's owner reference. A course without an owner belongs to nobody.
pub fn owns(account: &Account, course: &Course) -> bool {
    course.owner == Some(account.id)
}

/// Allow `principal` to act on `course` only if it owns it
pub async fn authorize_owner<S: Storage + ?Sized>(
    storage: &S,
    principal: &Principal,
    course: &Course,
) -> Result<Account, AppError> {
    let account = resolve_account(storage, principal).await?;
    if owns(&account, course) {
        Ok(account)
    } else {
        Err(DenyReason::Unauthorized.into())
    }
}
