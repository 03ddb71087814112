//! # Overlay Node Runtime
//!
//! Startup plumbing shared by the `node-runtime` binary and its tests:
//! configuration loading, logging setup and identity bootstrap.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_identity::{provision_with_config, Identity, IdentityConfig};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_VAR: &str = "OVERLAY_CONFIG";

/// A node whose identity has been provisioned.
#[derive(Debug)]
pub struct NodeRuntime {
    config: IdentityConfig,
    identity: Identity,
}

impl NodeRuntime {
    /// Provision the identity described by `config`.
    ///
    /// The key store is closed again before this returns; routing components
    /// only ever see the derived [`Identity`].
    pub fn bootstrap(config: IdentityConfig) -> Result<Self> {
        info!(
            data_dir = %config.data_dir.display(),
            backend = ?config.backend,
            "Provisioning node identity"
        );

        let identity = provision_with_config(&config).with_context(|| {
            format!(
                "Failed to provision identity in {}",
                config.data_dir.display()
            )
        })?;

        Ok(Self { config, identity })
    }

    /// The provisioned identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The configuration the node was bootstrapped with.
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Log the node's identity.
    pub fn report(&self) {
        info!("===========================================");
        info!("  Overlay Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!("Node ID: {}", self.identity.id_hex());
        info!("Address: 0x{}", self.identity.address_hex());
        info!("Data Dir: {:?}", self.config.data_dir);
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<IdentityConfig> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration from any variable source.
///
/// Reads the file named by `OVERLAY_CONFIG` when set (defaults otherwise),
/// then applies `OVERLAY_*` overrides.
pub fn load_config_from<F>(lookup: F) -> Result<IdentityConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_VAR) {
        Some(path) => IdentityConfig::load(Path::new(&path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => IdentityConfig::default(),
    };

    config
        .apply_overrides(lookup)
        .context("Invalid environment override")?;
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("Invalid log filter '{}'", default_level))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    use node_identity::StoreBackend;

    fn vars(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load_config_from(|_| None).unwrap();
        assert_eq!(config, IdentityConfig::default());
    }

    #[test]
    fn test_file_then_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        fs::write(
            &path,
            "[identity]\nkey_name = \"FromFile\"\nlock_timeout_ms = 900\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = load_config_from(vars(&[
            (CONFIG_PATH_VAR, path.display().to_string()),
            ("OVERLAY_KEY_NAME", "FromEnv".to_string()),
        ]))
        .unwrap();

        assert_eq!(config.key_name, "FromEnv");
        assert_eq!(config.lock_timeout_ms, 900);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.backend, StoreBackend::File);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let result = load_config_from(vars(&[(
            CONFIG_PATH_VAR,
            "/no/such/overlay.toml".to_string(),
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_override_is_error() {
        let result = load_config_from(vars(&[("OVERLAY_KEY_NAME", String::new())]));
        assert!(result.is_err());
    }

    #[test]
    fn test_bootstrap_is_stable_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let config = IdentityConfig::with_data_dir(dir.path());

        let first = NodeRuntime::bootstrap(config.clone()).unwrap();
        let second = NodeRuntime::bootstrap(config).unwrap();

        assert_eq!(first.identity(), second.identity());
        assert_eq!(first.config().data_dir, dir.path());
    }

    #[test]
    fn test_bootstrap_reports_corrupt_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("identity.kv"), [1u8, 2, 3]).unwrap();

        let err = NodeRuntime::bootstrap(IdentityConfig::with_data_dir(dir.path())).unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to provision identity"));
    }
}
