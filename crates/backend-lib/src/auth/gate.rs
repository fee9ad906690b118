// ============================
// courses-backend-lib/src/auth/gate.rs
// ============================
//! The request gate: one place where every route's authentication and
//! authorization decision is made.
//!
//! Per request the gate moves `Unauthenticated -> {Authenticated, Denied}`;
//! resource-scoped routes continue `Authenticated -> {Authorized, Forbidden}`.
//! There is exactly one attempt per request. On deny the middleware returns
//! the terminal response and the handler never runs.
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    credentials::{self, BasicCredentials},
    ownership, token, DenyReason, Principal, ScryptHasher, TokenService,
};
use crate::error::AppError;
use crate::metrics::{AUTH_DENIED, AUTH_LOGIN, TOKEN_ISSUED};
use crate::records::{Account, Course};
use crate::storage::Storage;
use crate::AppState;

/// Which authentication mechanism a route accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Basic credentials only (login)
    Credentials,
    /// Session token only; Basic credentials never substitute for it
    Token,
    /// Token if a token header is present, else Basic credentials
    Any,
}

/// How the principal of a request was established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Credentials,
    Token,
}

/// Request extension set by the gate on allow
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub principal: Principal,
    pub method: AuthMethod,
}

/// Request extension set by the owner gate on allow
#[derive(Debug, Clone)]
pub struct OwnedCourse {
    pub owner: Account,
    pub course: Course,
}

/// Composes credential checks, token checks and the ownership rule
#[derive(Clone)]
pub struct RequestGate<S> {
    storage: S,
    hasher: ScryptHasher,
    tokens: Arc<TokenService>,
}

impl<S: Storage + Clone + 'static> RequestGate<S> {
    pub fn new(storage: S, hasher: ScryptHasher, tokens: TokenService) -> Self {
        Self {
            storage,
            hasher,
            tokens: Arc::new(tokens),
        }
    }

    pub fn hasher(&self) -> &ScryptHasher {
        &self.hasher
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Mode A: establish who is calling
    #[instrument(skip_all, fields(mode = ?mode))]
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        mode: GateMode,
    ) -> Result<Authenticated, AppError> {
        let method = match mode {
            GateMode::Credentials => AuthMethod::Credentials,
            GateMode::Token => AuthMethod::Token,
            GateMode::Any if token::has_token(headers) => AuthMethod::Token,
            GateMode::Any if credentials::has_basic(headers) => AuthMethod::Credentials,
            GateMode::Any => return Err(record_denial(DenyReason::MissingCredentials)),
        };

        let result = match method {
            AuthMethod::Credentials => self.authenticate_credentials(headers).await,
            AuthMethod::Token => self.authenticate_token(headers),
        };

        match result {
            Ok(principal) => Ok(Authenticated { principal, method }),
            Err(AppError::Denied(reason)) => Err(record_denial(reason)),
            Err(other) => Err(other),
        }
    }

    /// Verify Basic credentials against the account store
    pub async fn authenticate_credentials(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let creds =
            BasicCredentials::from_headers(headers).ok_or(DenyReason::MissingCredentials)?;
        let principal =
            credentials::authenticate_credentials(&self.storage, &self.hasher, creds).await?;
        info!(identity = principal.identity(), "credentials accepted");
        counter!(AUTH_LOGIN).increment(1);
        Ok(principal)
    }

    /// Verify the session token. No account lookup happens here.
    pub fn authenticate_token(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let token = token::bearer_token(headers).ok_or(DenyReason::MissingToken)?;
        Ok(self.tokens.verify(token)?)
    }

    /// Explicitly load the account a principal names
    pub async fn resolve_account(&self, principal: &Principal) -> Result<Account, AppError> {
        ownership::resolve_account(&self.storage, principal).await.map_err(|e| match e {
            AppError::Denied(reason) => record_denial(reason),
            other => other,
        })
    }

    /// Mode B: token, then the course named by `raw_id`, then ownership.
    ///
    /// An unknown or malformed id is a 404 once the caller is authenticated.
    #[instrument(skip_all, fields(course = raw_id))]
    pub async fn authorize_owner(
        &self,
        headers: &HeaderMap,
        raw_id: &str,
    ) -> Result<(Authenticated, OwnedCourse), AppError> {
        let authenticated = self.authenticate(headers, GateMode::Token).await?;
        let course = self.load_course(raw_id).await?;

        match ownership::authorize_owner(&self.storage, &authenticated.principal, &course).await {
            Ok(owner) => Ok((authenticated, OwnedCourse { owner, course })),
            Err(AppError::Denied(reason)) => Err(record_denial(reason)),
            Err(other) => Err(other),
        }
    }

    /// Issue a fresh token for a principal
    pub fn issue_token(&self, principal: &Principal) -> Result<String, AppError> {
        let token = self.tokens.issue(principal)?;
        counter!(TOKEN_ISSUED).increment(1);
        Ok(token)
    }

    async fn load_course(&self, raw_id: &str) -> Result<Course, AppError> {
        let id = Uuid::parse_str(raw_id).map_err(|_| AppError::NotFound(format!("course {raw_id}")))?;
        self.storage
            .course(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("course {id}")))
    }
}

/// Log and count a denial. The reason stays server-side.
fn record_denial(reason: DenyReason) -> AppError {
    warn!(reason = %reason, "request denied");
    counter!(AUTH_DENIED, "reason" => reason.as_str()).increment(1);
    AppError::Denied(reason)
}

async fn gate<S: Storage + Clone + 'static>(
    state: &AppState<S>,
    mode: GateMode,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers().clone();
    let authenticated = state.gate.authenticate(&headers, mode).await?;
    request.extensions_mut().insert(authenticated);
    Ok(next.run(request).await)
}

/// Middleware for login-style routes accepting either mechanism
pub async fn authenticate_any<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(&state, GateMode::Any, request, next).await
}

/// Middleware for routes that require Basic credentials
pub async fn require_credentials<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(&state, GateMode::Credentials, request, next).await
}

/// Middleware for routes that require a session token
pub async fn require_token<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(&state, GateMode::Token, request, next).await
}

/// Middleware for `/{id}` routes that require the caller to own the course
pub async fn require_owner<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers().clone();
    let (authenticated, owned) = state.gate.authorize_owner(&headers, &id).await?;
    request.extensions_mut().insert(authenticated);
    request.extensions_mut().insert(owned);
    Ok(next.run(request).await)
}
