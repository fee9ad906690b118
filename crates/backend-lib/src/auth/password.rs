// ============================
// courses-backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use rand::rngs::OsRng;
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Default scrypt cost (`log2(N)`)
pub const DEFAULT_COST: u8 = 15;

/// Accepted range for the scrypt cost
pub const MIN_COST: u8 = 1;
pub const MAX_COST: u8 = 20;

/// Password used to build the decoy hash for unknown accounts
const DECOY_PASSWORD: &str = "decoy password for unknown accounts";

/// A salted scrypt hash in PHC string format.
///
/// Only [`ScryptHasher::hash`] creates one from a plaintext, so an account
/// can never be built around an unhashed password.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Salted one-way password hashing with scrypt
#[derive(Clone)]
pub struct ScryptHasher {
    params: Params,
    decoy: HashedPassword,
}

impl std::fmt::Debug for ScryptHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScryptHasher")
            .field("log_n", &self.params.log_n())
            .finish_non_exhaustive()
    }
}

impl ScryptHasher {
    /// Create a hasher with the given cost (`log2(N)`)
    pub fn new(cost: u8) -> anyhow::Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            anyhow::bail!("scrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}");
        }
        let params = Params::new(
            cost,
            Params::RECOMMENDED_R,
            Params::RECOMMENDED_P,
            Params::RECOMMENDED_LEN,
        )
        .map_err(|e| anyhow::anyhow!("invalid scrypt cost {cost}: {e}"))?;
        let decoy = hash_with(params, DECOY_PASSWORD)?;
        Ok(Self { params, decoy })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> anyhow::Result<HashedPassword> {
        hash_with(self.params, plain)
    }

    /// Hash a password and zeroize the original
    pub fn hash_secure(&self, plain: &mut String) -> anyhow::Result<HashedPassword> {
        let hash = self.hash(plain);
        plain.zeroize();
        hash
    }

    /// Verify a password against a hash.
    ///
    /// The derived key is compared in constant time. A malformed hash never
    /// verifies.
    pub fn verify(&self, plain: &str, hash: &HashedPassword) -> bool {
        let parsed_hash = match PasswordHash::new(hash.as_str()) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }

    /// Spend the same work as a real verification and fail.
    ///
    /// Used when the account does not exist so response timing does not
    /// reveal which half of the credential pair was wrong.
    pub fn verify_decoy(&self, plain: &str) -> bool {
        let _ = self.verify(plain, &self.decoy);
        false
    }
}

fn hash_with(params: Params, plain: &str) -> anyhow::Result<HashedPassword> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();
    Ok(HashedPassword(hash))
}
