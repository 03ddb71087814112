//! Domain Errors for Node Identity
//!
//! Provisioning either yields a complete [`Identity`](super::Identity) or one
//! of these errors. There is no partially-built or zero-valued identity.

use shared_crypto::CryptoError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors from parsing or validating identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Byte sequence has the wrong length for a node identifier
    #[error("invalid node id length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },
    /// String is not valid hexadecimal
    #[error("invalid node id hex: {0}")]
    InvalidHex(String),
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during open/read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// What failed, including the path where known
        message: String,
    },
    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Where the stored data stopped making sense
        message: String,
    },
    /// Another process holds the store.
    #[error("KV store at {path} is locked by another process")]
    Locked {
        /// The lock file that could not be acquired
        path: String,
    },
}

/// Terminal failure of identity provisioning.
///
/// Always fatal to node startup: a node without a valid identity must not
/// join the overlay. Callers may retry provisioning wholesale.
#[derive(Debug, Error)]
pub enum KeyDerivationError {
    /// The key store could not be opened, read, or written.
    #[error("node key store unavailable: {0}")]
    Storage(#[from] KVStoreError),
    /// The persisted key does not decode to a valid secp256k1 secret.
    #[error("stored node key is invalid: {0}")]
    InvalidKey(#[source] CryptoError),
    /// Provisioning configuration was rejected before touching storage.
    #[error("identity configuration rejected: {0}")]
    Config(#[from] ConfigError),
}
