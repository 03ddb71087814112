//! # Shared Crypto - Node Identity Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Long-term node key, signing |
//! | `hashing` | Keccak-256 | NodeId and address derivation |
//! | `address` | Keccak-256(pubkey)[12..] | 20-byte network address |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Keccak-256**: the pre-standard SHA-3 padding used by Ethereum tooling
//! - Secret key bytes are zeroized when a keypair is dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use address::{Address, ADDRESS_LENGTH};
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature, SECRET_KEY_LENGTH};
pub use errors::CryptoError;
pub use hashing::{keccak256, Hash};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
