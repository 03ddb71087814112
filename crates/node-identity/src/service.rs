//! # Identity Provisioning Service
//!
//! Wires the domain to the key store port: load the node's long-term key,
//! or create and persist one on first run, then derive the [`Identity`].
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Take the data directory lock
//! 3. Open the configured key store
//! 4. Read `NodePvk`; generate and persist a key if absent
//! 5. Derive public key → address → node id
//! 6. Close the store, release the lock, hand out the identity
//!
//! Run this once, before any routing component starts.

use std::path::Path;

use shared_crypto::Secp256k1KeyPair;
use tracing::{info, instrument};
use zeroize::Zeroizing;

use crate::adapters::{FileBackedKVStore, StoreLock};
use crate::config::{IdentityConfig, StoreBackend, DEFAULT_KEY_NAME};
use crate::domain::{Identity, KeyDerivationError};
use crate::ports::KeyValueStore;

/// Provisions the node identity from an explicit key store.
///
/// The store is injected rather than looked up globally, so tests run
/// against `InMemoryKVStore` and production picks its adapter from config.
pub struct IdentityProvisioner<S: KeyValueStore> {
    store: S,
    key_name: Vec<u8>,
}

impl<S: KeyValueStore> IdentityProvisioner<S> {
    /// Provisioner reading and writing the default `NodePvk` entry.
    pub fn new(store: S) -> Self {
        Self::with_key_name(store, DEFAULT_KEY_NAME)
    }

    /// Provisioner using a custom entry name.
    pub fn with_key_name(store: S, key_name: impl AsRef<[u8]>) -> Self {
        Self {
            store,
            key_name: key_name.as_ref().to_vec(),
        }
    }

    /// Load or create the long-term key and derive the identity.
    ///
    /// # Errors
    ///
    /// - `Storage` if the read or the first-run write fails
    /// - `InvalidKey` if the stored bytes are not a valid secret key; the
    ///   stored key is never replaced, since that would silently change
    ///   the node's identity
    pub fn provision(&mut self) -> Result<Identity, KeyDerivationError> {
        let (keypair, origin) = self.fetch_or_generate()?;
        let identity = Identity::from_keypair(&keypair);
        info!(
            node_id = %identity.node_id(),
            address = %identity.address(),
            "{} node key",
            origin.as_str()
        );
        Ok(identity)
    }

    /// Load the stored key, or generate and persist a new one.
    pub fn load_or_create_key(&mut self) -> Result<Secp256k1KeyPair, KeyDerivationError> {
        self.fetch_or_generate().map(|(keypair, _)| keypair)
    }

    fn fetch_or_generate(&mut self) -> Result<(Secp256k1KeyPair, KeyOrigin), KeyDerivationError> {
        match self.store.get(&self.key_name)? {
            Some(stored) => {
                let stored = Zeroizing::new(stored);
                let keypair = Secp256k1KeyPair::from_slice(&stored)
                    .map_err(KeyDerivationError::InvalidKey)?;
                Ok((keypair, KeyOrigin::Loaded))
            }
            None => {
                let keypair = Secp256k1KeyPair::generate();
                let secret = Zeroizing::new(keypair.to_bytes());
                self.store.put(&self.key_name, &secret[..])?;
                Ok((keypair, KeyOrigin::Generated))
            }
        }
    }

    /// Give the store back (closing it is up to the caller).
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Whether provisioning found the key or had to create it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOrigin {
    Loaded,
    Generated,
}

impl KeyOrigin {
    fn as_str(self) -> &'static str {
        match self {
            KeyOrigin::Loaded => "Loaded existing",
            KeyOrigin::Generated => "Generated and stored new",
        }
    }
}

/// Provision the identity stored under `data_dir` with default settings.
pub fn provision(data_dir: impl AsRef<Path>) -> Result<Identity, KeyDerivationError> {
    provision_with_config(&IdentityConfig::with_data_dir(data_dir.as_ref()))
}

/// Provision the identity described by `config`.
///
/// Holds the data directory lock for the whole open/read-or-write/close
/// cycle; nothing stays open once this returns.
#[instrument(skip_all, fields(data_dir = %config.data_dir.display(), backend = ?config.backend))]
pub fn provision_with_config(config: &IdentityConfig) -> Result<Identity, KeyDerivationError> {
    config.validate()?;

    let _lock = StoreLock::acquire(&config.data_dir, config.lock_timeout())?;

    match config.backend {
        StoreBackend::File => {
            let store = FileBackedKVStore::open(config.store_path())?
                .with_sync_writes(config.sync_writes);
            IdentityProvisioner::with_key_name(store, &config.key_name).provision()
        }
        #[cfg(feature = "rocksdb")]
        StoreBackend::RocksDb => {
            let store =
                crate::adapters::RocksDbStore::open(config.store_path(), config.sync_writes)?;
            IdentityProvisioner::with_key_name(store, &config.key_name).provision()
        }
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::RocksDb => {
            Err(crate::config::ConfigError::BackendUnavailable("rocksdb").into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KVStoreError;
    use crate::ports::InMemoryKVStore;
    use shared_crypto::CryptoError;

    /// Store whose reads or writes always fail.
    struct FailingStore {
        fail_get: bool,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
            if self.fail_get {
                Err(KVStoreError::IOError {
                    message: "disk unplugged".into(),
                })
            } else {
                Ok(None)
            }
        }

        fn put(&mut self, _key: &[u8], _value: &[u8]) -> Result<(), KVStoreError> {
            Err(KVStoreError::IOError {
                message: "read-only filesystem".into(),
            })
        }
    }

    #[test]
    fn test_first_run_generates_and_persists() {
        let mut store = InMemoryKVStore::new();

        let identity = IdentityProvisioner::new(&mut store).provision().unwrap();

        let stored = store.get(b"NodePvk").unwrap().expect("key persisted");
        assert_eq!(stored.len(), 32);
        let reloaded = Secp256k1KeyPair::from_slice(&stored).unwrap();
        assert_eq!(Identity::from_keypair(&reloaded), identity);
    }

    #[test]
    fn test_second_run_loads_same_key() {
        let mut store = InMemoryKVStore::new();

        let first = IdentityProvisioner::new(&mut store).provision().unwrap();
        let second = IdentityProvisioner::new(&mut store).provision().unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_existing_key_is_used() {
        let mut store = InMemoryKVStore::new();
        let mut secret = [0u8; 32];
        secret[31] = 1;
        store.put(b"NodePvk", &secret).unwrap();

        let identity = IdentityProvisioner::new(store).provision().unwrap();

        assert_eq!(
            identity.address_hex(),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_custom_key_name() {
        let mut store = InMemoryKVStore::new();
        IdentityProvisioner::with_key_name(&mut store, "AltKey")
            .provision()
            .unwrap();

        assert!(store.get(b"AltKey").unwrap().is_some());
        assert!(store.get(b"NodePvk").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_key_is_not_replaced() {
        let mut store = InMemoryKVStore::new();
        store.put(b"NodePvk", &[0xFF; 32]).unwrap();

        let result = IdentityProvisioner::new(&mut store).provision();

        assert!(matches!(
            result,
            Err(KeyDerivationError::InvalidKey(CryptoError::InvalidPrivateKey))
        ));
        assert_eq!(store.get(b"NodePvk").unwrap(), Some(vec![0xFF; 32]));
    }

    #[test]
    fn test_wrong_length_key_is_invalid() {
        let mut store = InMemoryKVStore::new();
        store.put(b"NodePvk", b"short").unwrap();

        let result = IdentityProvisioner::new(store).provision();

        assert!(matches!(
            result,
            Err(KeyDerivationError::InvalidKey(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 5
            }))
        ));
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let result = IdentityProvisioner::new(FailingStore { fail_get: true }).provision();
        assert!(matches!(result, Err(KeyDerivationError::Storage(_))));
    }

    #[test]
    fn test_write_failure_is_fatal() {
        let result = IdentityProvisioner::new(FailingStore { fail_get: false }).provision();
        assert!(matches!(
            result,
            Err(KeyDerivationError::Storage(KVStoreError::IOError { .. }))
        ));
    }

    #[test]
    fn test_generate_then_load_reports_origin() {
        let mut provisioner = IdentityProvisioner::new(InMemoryKVStore::new());

        let (created, origin) = provisioner.fetch_or_generate().unwrap();
        assert_eq!(origin, KeyOrigin::Generated);

        let (loaded, origin) = provisioner.fetch_or_generate().unwrap();
        assert_eq!(origin, KeyOrigin::Loaded);
        assert_eq!(loaded.to_bytes(), created.to_bytes());
        assert_eq!(
            Identity::from_keypair(&loaded),
            provisioner.provision().unwrap()
        );
    }

    #[test]
    fn test_load_or_create_key_matches_provisioned_identity() {
        let mut store = InMemoryKVStore::new();
        let keypair = IdentityProvisioner::new(&mut store)
            .load_or_create_key()
            .unwrap();

        let identity = IdentityProvisioner::new(&mut store).provision().unwrap();

        assert_eq!(Identity::from_keypair(&keypair), identity);
    }

    #[test]
    fn test_unsynced_file_backend_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = IdentityConfig {
            sync_writes: false,
            ..IdentityConfig::with_data_dir(dir.path())
        };

        let first = provision_with_config(&config).unwrap();
        let second = provision_with_config(&config).unwrap();

        assert_eq!(first, second);
        assert!(config.store_path().exists());
    }

    #[test]
    fn test_into_store_returns_written_store() {
        let mut provisioner = IdentityProvisioner::new(InMemoryKVStore::new());
        provisioner.provision().unwrap();
        assert_eq!(provisioner.into_store().len(), 1);
    }

    #[test]
    fn test_provision_with_invalid_config_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = IdentityConfig {
            key_name: String::new(),
            ..IdentityConfig::with_data_dir(dir.path().join("node"))
        };

        let result = provision_with_config(&config);

        assert!(matches!(result, Err(KeyDerivationError::Config(_))));
        assert!(!dir.path().join("node").exists());
    }
}
