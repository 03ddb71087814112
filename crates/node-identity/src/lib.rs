//! # Node Identity Subsystem
//!
//! The identity of an overlay participant and the XOR metric used to place
//! it in a Kademlia-style routing space.
//!
//! ## Derivation
//!
//! ```text
//! secp256k1 secret ─▶ public key ─▶ address = Keccak256(pubkey)[12..] ─▶ node_id = Keccak256(address)
//! ```
//!
//! ## Architecture
//!
//! Hexagonal, like the rest of the node:
//! - **Domain Layer:** `Identity`, `NodeId`, `Distance`, prefix length (pure)
//! - **Ports Layer:** `KeyValueStore`, the only thing provisioning needs
//! - **Service Layer:** `IdentityProvisioner` and `provision`
//! - **Adapters Layer:** file and RocksDB key stores, fs2 directory lock
//!
//! ## Example
//!
//! ```rust
//! use node_identity::{IdentityProvisioner, InMemoryKVStore};
//!
//! let mut store = InMemoryKVStore::new();
//! let identity = IdentityProvisioner::new(&mut store).provision().unwrap();
//!
//! assert!(identity.equals(identity.node_id().as_bytes()));
//! assert_eq!(identity.id_hex().len(), 64);
//!
//! // A second bootstrap against the same store yields the same identity.
//! let again = IdentityProvisioner::new(&mut store).provision().unwrap();
//! assert_eq!(identity, again);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Domain
pub use domain::{
    cmp_by_distance, find_k_closest, leading_zero_bits, sort_by_distance, xor_bytes, Distance,
    Identity, IdentityError, KVStoreError, KeyDerivationError, NodeId, NODE_ID_BITS,
    NODE_ID_LENGTH,
};

// Ports and adapters
pub use adapters::{FileBackedKVStore, StoreLock};
#[cfg(feature = "rocksdb")]
pub use adapters::RocksDbStore;
pub use ports::{InMemoryKVStore, KeyValueStore};

// Service and configuration
pub use config::{ConfigError, IdentityConfig, StoreBackend, DEFAULT_KEY_NAME};
pub use service::{provision, provision_with_config, IdentityProvisioner};

// Key material types callers see through `Identity`
pub use shared_crypto::{Address, Secp256k1KeyPair, Secp256k1PublicKey};
