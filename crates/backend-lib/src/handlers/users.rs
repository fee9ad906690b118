// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! Account registration and the current-user endpoint.
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use courses_common::{NewUser, UserResponse};
use metrics::counter;
use tracing::info;

use crate::auth::gate::{AuthMethod, Authenticated};
use crate::error::AppError;
use crate::metrics::ACCOUNT_REGISTERED;
use crate::records::Account;
use crate::storage::Storage;
use crate::validation::validate_new_user;
use crate::AppState;

/// `POST /api/users`: register an account
pub async fn register<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(mut payload): Json<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    validate_new_user(&payload)?;

    let mut password = payload.password.take().unwrap_or_default();
    let hasher = state.gate.hasher().clone();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash_secure(&mut password))
        .await?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let account = Account::new(
        payload.first_name.unwrap_or_default().trim(),
        payload.last_name.unwrap_or_default().trim(),
        payload.email_address.as_deref().unwrap_or_default(),
        password_hash,
    );
    let id = account.id;
    state.storage.insert_account(account).await?;

    info!(account = %id, "account registered");
    counter!(ACCOUNT_REGISTERED).increment(1);
    Ok((StatusCode::CREATED, [(header::LOCATION, "/")]))
}

/// `GET /api/users` and `POST /api/users/login`: the authenticated user.
///
/// Credential logins receive a fresh token; token-authenticated reads load
/// the account explicitly and return it without a token.
pub async fn current_user<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<Authenticated>,
) -> Result<Json<UserResponse>, AppError> {
    let response = match (auth.method, auth.principal.summary()) {
        (AuthMethod::Credentials, Some(user)) => UserResponse {
            user,
            token: Some(state.gate.issue_token(&auth.principal)?),
        },
        _ => UserResponse {
            user: state.gate.resolve_account(&auth.principal).await?.summary(),
            token: None,
        },
    };
    Ok(Json(response))
}
