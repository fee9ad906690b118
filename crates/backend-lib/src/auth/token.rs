// ============================
// courses-backend-lib/src/auth/token.rs
// ============================
//! Signed, time-bound session tokens.
//!
//! Tokens are HS256 JWTs binding one identity. They are stateless: there is
//! no server-side session table and no revocation, a token simply stops
//! verifying once its expiry has passed.
use std::time::Duration;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DenyReason, Principal};
use crate::error::AppError;

/// Default token lifetime (30 days)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

/// Longest accepted token lifetime (10 years)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 10);

/// Authorization schemes that are never a bare token
const SCHEMES: [&str; 2] = ["Bearer", "Basic"];

/// Header accepted as an alternative to `Authorization`
pub const TOKEN_HEADER: &str = "x-auth-token";

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Bound identity (normalized email)
    pub sub: String,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Unique per issuance so a new login never repeats a token
    pub jti: String,
}

/// Issues and verifies session tokens with one process-wide secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service from the signing secret and token lifetime
    pub fn new(secret: &[u8], ttl: Duration) -> anyhow::Result<Self> {
        anyhow::ensure!(!secret.is_empty(), "token secret must not be empty");
        anyhow::ensure!(
            !ttl.is_zero() && ttl <= MAX_TOKEN_TTL,
            "token ttl must be between 1s and {}s, got {}s",
            MAX_TOKEN_TTL.as_secs(),
            ttl.as_secs()
        );
        let ttl = chrono::Duration::from_std(ttl)?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Issue a token for `principal`, valid from now
    pub fn issue(&self, principal: &Principal) -> Result<String, AppError> {
        self.issue_at(principal, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(format!("token expiry overflows from {now}")))?;
        let claims = Claims {
            sub: principal.identity().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<Principal, DenyReason> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry as a pure function of `token` and `now`.
    ///
    /// A token is expired from the second named by its `exp` claim onward.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, DenyReason> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            DenyReason::InvalidToken
        })?;

        if now.timestamp() >= data.claims.exp {
            tracing::debug!(exp = data.claims.exp, "token expired");
            return Err(DenyReason::InvalidToken);
        }

        Ok(Principal::from_identity(data.claims.sub))
    }

    /// Lifetime of newly issued tokens
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }
}

/// Whether the request carries any token header at all
pub fn has_token(headers: &HeaderMap) -> bool {
    bearer_token(headers).is_some()
}

/// Extract the session token from request headers.
///
/// Accepts `Authorization: Bearer <token>`, a bare `Authorization: <token>`
/// and `X-Auth-Token: <token>`. A `Basic` authorization value is never a
/// token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        let value = value.trim();
        if let Some(token) = strip_scheme(value, "Bearer") {
            if !token.is_empty() {
                return Some(token);
            }
        } else if !value.is_empty()
            && !value.contains(' ')
            && !SCHEMES.iter().any(|scheme| value.eq_ignore_ascii_case(scheme))
        {
            // Legacy clients send the token without a scheme.
            return Some(value);
        }
    }

    headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Strip an auth scheme prefix, matching the scheme name case-insensitively
pub(crate) fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let (name, rest) = value.split_once(' ')?;
    name.eq_ignore_ascii_case(scheme).then(|| rest.trim())
}
