//! Store configuration.
//!
//! # Responsibility
//! - Load the encryption passphrase, database path and logging options
//!   from TOML, with environment variable overrides.
//! - Hand the static key to callers as a value, never as a global.
//!
//! # Invariants
//! - A resolved config always carries a non-empty passphrase.
//! - `Debug` output never contains the passphrase.

use crate::crypto::cipher::{CipherError, EncryptionKey};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_KEY: &str = "SECRET_NOTE_KEY";
pub const ENV_DB: &str = "SECRET_NOTE_DB";
pub const ENV_LOG_LEVEL: &str = "SECRET_NOTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SECRET_NOTE_LOG_DIR";

const DEFAULT_DATABASE_PATH: &str = "secret-notes.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("encryption key is not configured; set `encryption_key` or SECRET_NOTE_KEY")]
    MissingKey,
    #[error("invalid encryption key: {0}")]
    InvalidKey(#[from] CipherError),
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub encryption_key: String,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            encryption_key: String::new(),
            database_path: default_database_path(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("encryption_key", &"[REDACTED]")
            .field("database_path", &self.database_path)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl StoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given (defaults otherwise), applies environment
    /// overrides and checks that a key is present.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from `SECRET_NOTE_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(key) = non_blank(ENV_KEY) {
            self.encryption_key = key;
        }
        if let Some(db) = non_blank(ENV_DB) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encryption_key.is_empty() {
            return Err(ConfigError::MissingKey);
        }
        Ok(())
    }

    /// Derives the static note key from the configured passphrase.
    pub fn encryption_key(&self) -> Result<EncryptionKey, ConfigError> {
        self.validate()?;
        Ok(EncryptionKey::from_passphrase(&self.encryption_key)?)
    }
}
