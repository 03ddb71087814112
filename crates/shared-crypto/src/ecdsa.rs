//! # ECDSA Signatures (secp256k1)
//!
//! The long-term node key. Its public half is the root every derived
//! identifier hangs off, so encodings here must stay stable across releases.
//!
//! ## Security Properties
//!
//! - Keys are generated from the operating system CSPRNG
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2)
//!
//! ## Encodings
//!
//! - Secret key: 32 raw big-endian bytes (the form persisted by the node)
//! - Public key: SEC1, 33 bytes compressed or 65 bytes uncompressed

use crate::CryptoError;
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand::rngs::OsRng;
use zeroize::Zeroize;

/// Length of a raw secp256k1 secret key.
pub const SECRET_KEY_LENGTH: usize = 32;

/// secp256k1 public key, kept in both SEC1 forms.
///
/// The compressed form is what peers exchange; the uncompressed form feeds
/// address derivation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1PublicKey {
    compressed: [u8; 33],
    uncompressed: [u8; 65],
}

impl Secp256k1PublicKey {
    /// Parse from SEC1 bytes (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&verifying_key))
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let mut compressed = [0u8; 33];
        compressed.copy_from_slice(key.to_encoded_point(true).as_bytes());
        let mut uncompressed = [0u8; 65];
        uncompressed.copy_from_slice(key.to_encoded_point(false).as_bytes());
        Self {
            compressed,
            uncompressed,
        }
    }

    /// Compressed SEC1 bytes (0x02/0x03 prefix + x-coordinate).
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.compressed
    }

    /// Uncompressed SEC1 bytes (0x04 prefix + x + y).
    pub fn to_uncompressed(&self) -> [u8; 65] {
        self.uncompressed
    }

    /// Verify a signature.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &Secp256k1Signature,
    ) -> Result<(), CryptoError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(&self.compressed)
            .map_err(|_| CryptoError::InvalidPublicKey)?;

        let sig = Signature::from_slice(&signature.0).map_err(|_| CryptoError::InvalidSignature)?;

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

impl std::fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secp256k1PublicKey({})", hex::encode(self.compressed))
    }
}

/// ECDSA signature (64 bytes, r||s format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature([u8; 64]);

impl Secp256k1Signature {
    /// Create from bytes (64 bytes).
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// secp256k1 ECDSA keypair.
///
/// The inner `SigningKey` zeroizes its scalar on drop.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate a random keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    ///
    /// Fails for zero and for values not below the curve order.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a persisted secret key of unchecked length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut secret: [u8; SECRET_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: SECRET_KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        let result = Self::from_bytes(secret);
        secret.zeroize();
        result
    }

    /// Get the public key.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a message (deterministic RFC 6979).
    pub fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        let sig: Signature = self.signing_key.sign(message);
        let bytes: [u8; 64] = sig.to_bytes().into();
        Secp256k1Signature(bytes)
    }

    /// Get secret key bytes (for persistence).
    ///
    /// **Security:** the caller owns the copy and should zeroize it once stored.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
