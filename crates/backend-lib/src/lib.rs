// ============================
// courses-backend-lib/src/lib.rs
// ============================
//! Core functionality for the Courses API server: accounts, courses owned
//! by accounts, and the authentication/ownership gate in front of them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod records;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{RequestGate, ScryptHasher, TokenService};
use crate::config::Settings;
use crate::storage::Storage;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Storage backend
    pub storage: S,
    /// Authentication and ownership gate
    pub gate: RequestGate<S>,
    /// Settings, fixed for the life of the process
    pub settings: Arc<Settings>,
}

impl<S: Storage + Clone + 'static> AppState<S> {
    /// Create a new application state.
    ///
    /// Fails if the token secret is missing: the service cannot run
    /// without it.
    pub fn new(storage: S, settings: Settings) -> anyhow::Result<Self> {
        let secret = settings.secret()?;
        let tokens = TokenService::new(secret.expose().as_bytes(), settings.token_ttl())?;
        let hasher = ScryptHasher::new(settings.password_cost)?;

        Ok(Self {
            gate: RequestGate::new(storage.clone(), hasher, tokens),
            storage,
            settings: Arc::new(settings),
        })
    }
}
