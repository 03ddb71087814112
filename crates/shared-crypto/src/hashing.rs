//! # Keccak-256 Hashing
//!
//! The content-addressing hash behind node ids and network addresses.
//! This is Keccak with the original padding, not NIST SHA3-256; the two
//! produce different digests for the same input.

use sha3::{Digest, Keccak256};

/// Keccak-256 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with Keccak-256.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}
