//! # Network Address
//!
//! A 20-byte address derived from a secp256k1 public key as
//! `Keccak256(uncompressed_pubkey[1..])[12..32]`, the right-most 20 bytes of
//! the hash over the 64-byte `x || y` encoding. This is the Ethereum account
//! address scheme, so addresses line up with existing tooling.

use crate::{keccak256, Secp256k1PublicKey};

/// Length of a network address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// 20-byte network address.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Construct from a 20-byte array.
    #[inline]
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive the address of a public key.
    pub fn from_public_key(public_key: &Secp256k1PublicKey) -> Self {
        let uncompressed = public_key.to_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&hash[32 - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Borrow the underlying 20 bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Lowercase hex without a `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Address {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}
