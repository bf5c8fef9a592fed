//! Service configuration.
//!
//! Loaded from TOML. Relative paths in a file are resolved against the
//! file's directory. A minimal file:
//!
//! ```toml
//! key_path = "keys/ecdsa_p256_public_key.pem"
//! journal_path = "redemptions.qrj"
//!
//! [[schools]]
//! id = 1
//! members = [42, 99]
//! ```

use qrmark_canonical::{SchoolId, UserId};
use qrmark_ledger::{LedgerOptions, StaticSchoolDirectory, WriteOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `key_path`.
pub const ENV_KEY_PATH: &str = "QRMARK_KEY_PATH";
/// Environment variable overriding `journal_path`.
pub const ENV_JOURNAL_PATH: &str = "QRMARK_JOURNAL_PATH";
/// Environment variable overriding `lock_timeout_ms`.
pub const ENV_LOCK_TIMEOUT_MS: &str = "QRMARK_LOCK_TIMEOUT_MS";

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Location of the PEM or DER encoded P-256 public key.
    pub key_path: PathBuf,

    /// Redemption journal. Without one the ledger lives in memory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,

    /// Bound on any single ledger lock wait, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Clock skew tolerated on `exp`/`nbf`, in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// Records per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Fsync every journal append.
    #[serde(default)]
    pub sync_writes: bool,

    /// School membership.
    #[serde(default)]
    pub schools: Vec<SchoolConfig>,
}

/// One school and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolConfig {
    /// School identifier.
    pub id: SchoolId,
    /// Users belonging to the school.
    #[serde(default)]
    pub members: Vec<UserId>,
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_page_size() -> usize {
    20
}

impl ServiceConfig {
    /// Configuration with defaults for everything but the key location.
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            journal_path: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            leeway_secs: 0,
            page_size: default_page_size(),
            sync_writes: false,
            schools: Vec::new(),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Applies `QRMARK_*` environment overrides, then re-validates.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup, then re-validates.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_KEY_PATH).filter(|v| !v.is_empty()) {
            self.key_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_JOURNAL_PATH).filter(|v| !v.is_empty()) {
            self.journal_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_LOCK_TIMEOUT_MS) {
            self.lock_timeout_ms = raw.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("{ENV_LOCK_TIMEOUT_MS} is not an integer: {raw:?}"))
            })?;
        }
        self.validate()
    }

    /// Checks value ranges and school membership.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Validation("page_size must be positive".to_string()));
        }
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "lock_timeout_ms must be positive".to_string(),
            ));
        }

        let mut seen: HashMap<UserId, SchoolId> = HashMap::new();
        for school in &self.schools {
            for user in &school.members {
                if let Some(previous) = seen.insert(*user, school.id) {
                    if previous != school.id {
                        return Err(ConfigError::Validation(format!(
                            "user {user} is listed in schools {previous} and {}",
                            school.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_relative(&mut self, base: &Path) {
        if self.key_path.is_relative() {
            self.key_path = base.join(&self.key_path);
        }
        if let Some(journal) = self.journal_path.as_mut() {
            if journal.is_relative() {
                *journal = base.join(&*journal);
            }
        }
    }

    /// Ledger lock timeout.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Ledger options derived from this configuration.
    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions::with_lock_timeout(self.lock_timeout())
    }

    /// Journal write options derived from this configuration.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            sync: self.sync_writes,
            ..WriteOptions::default()
        }
    }

    /// School directory built from the `[[schools]]` tables.
    pub fn school_directory(&self) -> StaticSchoolDirectory {
        self.schools
            .iter()
            .map(|school| (school.id, school.members.clone()))
            .collect()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),

    /// The configured journal could not be opened.
    #[error("failed to open ledger: {0}")]
    Ledger(#[from] qrmark_ledger::LedgerError),
}
