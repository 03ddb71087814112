//! # Identity Configuration
//!
//! Where the node key lives and how provisioning reaches it.
//!
//! Sources, later ones winning:
//! 1. `IdentityConfig::default()`
//! 2. A TOML file (`IdentityConfig::load`)
//! 3. `OVERLAY_*` environment variables (`apply_env_overrides`)
//!
//! # Config File Format
//!
//! ```toml
//! [identity]
//! data_dir = "./data/identity"
//! key_name = "NodePvk"
//! backend = "file"          # or "rocksdb"
//! sync_writes = true
//! lock_timeout_ms = 5000
//!
//! [logging]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Well-known key under which the node's private key is stored.
pub const DEFAULT_KEY_NAME: &str = "NodePvk";

/// Which key store adapter backs provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Single-file store (`identity.kv` inside the data directory).
    #[default]
    File,
    /// RocksDB database (`identity.db` inside the data directory).
    RocksDb,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(ConfigError::Invalid(format!(
                "unknown store backend '{}' (expected 'file' or 'rocksdb')",
                other
            ))),
        }
    }
}

/// Identity provisioning configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Directory holding the key store and its lock file.
    pub data_dir: PathBuf,
    /// Store key for the private key (default `NodePvk`).
    pub key_name: String,
    /// Key store adapter.
    pub backend: StoreBackend,
    /// fsync every key store write, for both the file and RocksDB backends
    /// (default: true).
    pub sync_writes: bool,
    /// How long to wait for another process to release the store.
    pub lock_timeout_ms: u64,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/identity"),
            key_name: DEFAULT_KEY_NAME.to_string(),
            backend: StoreBackend::File,
            sync_writes: true,
            lock_timeout_ms: 5_000,
            log_level: "info".to_string(),
        }
    }
}

impl IdentityConfig {
    /// Default configuration rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string; missing fields keep defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = Self::default();
        let ic = file.identity;
        Ok(Self {
            data_dir: ic.data_dir.unwrap_or(defaults.data_dir),
            key_name: ic.key_name.unwrap_or(defaults.key_name),
            backend: ic.backend.unwrap_or(defaults.backend),
            sync_writes: ic.sync_writes.unwrap_or(defaults.sync_writes),
            lock_timeout_ms: ic.lock_timeout_ms.unwrap_or(defaults.lock_timeout_ms),
            log_level: file.logging.level.unwrap_or(defaults.log_level),
        })
    }

    /// Override fields from `OVERLAY_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from any variable source.
    ///
    /// Recognised: `OVERLAY_DATA_DIR`, `OVERLAY_KEY_NAME`,
    /// `OVERLAY_STORE_BACKEND`, `OVERLAY_LOCK_TIMEOUT_MS`, `OVERLAY_LOG_LEVEL`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("OVERLAY_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("OVERLAY_KEY_NAME") {
            self.key_name = name;
        }
        if let Some(backend) = lookup("OVERLAY_STORE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(timeout) = lookup("OVERLAY_LOCK_TIMEOUT_MS") {
            self.lock_timeout_ms = timeout.parse().map_err(|_| {
                ConfigError::Invalid(format!("OVERLAY_LOCK_TIMEOUT_MS is not a number: {}", timeout))
            })?;
        }
        if let Some(level) = lookup("OVERLAY_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Reject settings provisioning cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_name.is_empty() {
            return Err(ConfigError::Invalid("key_name must not be empty".into()));
        }
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "lock_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.backend == StoreBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::BackendUnavailable("rocksdb"));
        }
        Ok(())
    }

    /// Lock timeout as a `Duration`.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Location of the store for the configured backend.
    pub fn store_path(&self) -> PathBuf {
        match self.backend {
            StoreBackend::File => self.data_dir.join("identity.kv"),
            StoreBackend::RocksDb => self.data_dir.join("identity.db"),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    identity: IdentityConfigFile,
    #[serde(default)]
    logging: LoggingConfigFile,
}

#[derive(Debug, Deserialize, Default)]
struct IdentityConfigFile {
    data_dir: Option<PathBuf>,
    key_name: Option<String>,
    backend: Option<StoreBackend>,
    sync_writes: Option<bool>,
    lock_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingConfigFile {
    level: Option<String>,
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {error}")]
    Io {
        /// The config file that was requested
        path: String,
        /// The underlying I/O error message
        error: String,
    },
    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// A value is out of range or malformed.
    #[error("Invalid config: {0}")]
    Invalid(String),
    /// The selected backend was not compiled in.
    #[error("Store backend '{0}' requires building with the matching feature")]
    BackendUnavailable(&'static str),
}
