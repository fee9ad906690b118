// ============================
// courses-backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `COURSES_`-prefixed environment variables.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;
use zeroize::Zeroize;

use crate::auth::password::{DEFAULT_COST, MAX_COST, MIN_COST};
use crate::auth::token::{DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL};

/// Default configuration file
pub const DEFAULT_CONFIG_FILE: &str = "courses.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "COURSES_";

/// Settings key of the token secret
const SECRET_KEY: &str = "token_secret";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("token_secret is not configured; set it in the config file or COURSES_TOKEN_SECRET")]
    MissingSecret,

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("token_ttl_secs is out of range: {0}")]
    InvalidTokenTtl(u64),

    #[error("password_cost is out of range: {0}")]
    InvalidPasswordCost(u8),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// A configuration value that must never be logged.
///
/// `Debug` is redacted and the contents are wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SecretVisitor;

        impl de::Visitor<'_> for SecretVisitor {
            type Value = Secret;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("the token secret as a string (quote numeric secrets in TOML)")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Secret, E> {
                Ok(Secret::new(value))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Secret, E> {
                Ok(Secret(value))
            }
        }

        deserializer.deserialize_string(SecretVisitor)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Which storage backend to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// JSON files under `data_dir`
    File,
    /// Process memory, lost on restart
    Memory,
}

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Storage backend
    pub storage: StorageKind,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Token signing secret. Required.
    pub token_secret: Option<Secret>,
    /// scrypt cost (`log2(N)`)
    pub password_cost: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            data_dir: PathBuf::from("data"),
            storage: StorageKind::File,
            log_level: "info".to_string(),
            log_json: false,
            token_ttl_secs: DEFAULT_TOKEN_TTL.as_secs(),
            token_secret: None,
            password_cost: DEFAULT_COST,
        }
    }
}

impl Settings {
    /// Load settings from the default file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from `path` and the environment. A missing file is
    /// not an error; the environment alone may configure the service.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Self::figment(path.as_ref()).extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    /// The provider stack, exposed for callers that add their own layers.
    ///
    /// The environment secret is taken verbatim: the generic env layer would
    /// turn `0123` into the integer 123.
    pub fn figment(path: &Path) -> Figment {
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&[SECRET_KEY]));

        let var = format!("{ENV_PREFIX}{}", SECRET_KEY.to_uppercase());
        match std::env::var(var) {
            Ok(raw) => figment.merge(Serialized::default(SECRET_KEY, raw)),
            Err(_) => figment,
        }
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.secret()?;
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL.as_secs() {
            return Err(ConfigError::InvalidTokenTtl(self.token_ttl_secs));
        }
        if !(MIN_COST..=MAX_COST).contains(&self.password_cost) {
            return Err(ConfigError::InvalidPasswordCost(self.password_cost));
        }
        Ok(())
    }

    /// The token signing secret; missing or blank is fatal
    pub fn secret(&self) -> Result<&Secret, ConfigError> {
        self.token_secret
            .as_ref()
            .filter(|s| !s.expose().trim().is_empty())
            .ok_or(ConfigError::MissingSecret)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
