//! Value Objects for Node Identity
//!
//! `NodeId` is the routing-space coordinate, `Distance` the XOR metric
//! between two coordinates.

use std::fmt;
use std::str::FromStr;

use shared_crypto::{keccak256, Address};

use crate::domain::errors::IdentityError;
use crate::domain::services::{constant_time_eq, leading_zero_bits};

/// Length of a node identifier in bytes (Keccak-256 output).
pub const NODE_ID_LENGTH: usize = 32;

/// Number of bits in a node identifier.
pub const NODE_ID_BITS: usize = NODE_ID_LENGTH * 8;

/// 256-bit node identifier: `Keccak256(network_address)`.
///
/// # Security (Timing Attack Prevention)
///
/// Comparison is constant-time. Standard `PartialEq` for byte arrays
/// short-circuits on first difference, which lets a remote observer recover
/// identifiers byte by byte from response timing.
// derived Hash is consistent with the manual PartialEq: equal ids have equal bytes.
#[allow(clippy::derived_hash_with_manual_eq)]
#[derive(Clone, Copy, Hash)]
pub struct NodeId(pub [u8; NODE_ID_LENGTH]);

impl PartialEq for NodeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for NodeId {}

impl NodeId {
    /// Create a NodeId from a raw 32-byte array.
    pub fn new(bytes: [u8; NODE_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive the NodeId of a network address.
    pub fn from_address(address: &Address) -> Self {
        Self(keccak256(address.as_bytes()))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; NODE_ID_LENGTH] {
        &self.0
    }

    /// The all-zero id, the reference point for prefix length.
    pub fn zero() -> Self {
        Self([0u8; NODE_ID_LENGTH])
    }

    /// XOR distance to another id.
    pub fn distance(&self, other: &NodeId) -> Distance {
        let mut out = [0u8; NODE_ID_LENGTH];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] ^ other.0[i];
        }
        Distance(out)
    }

    /// Count of leading zero bits; 255 for the all-zero id.
    pub fn leading_zeros(&self) -> usize {
        leading_zero_bits(&self.0)
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for NodeId {
    type Error = IdentityError;

    /// Peer-supplied identifiers of any other length are rejected rather
    /// than padded or truncated.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; NODE_ID_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| IdentityError::InvalidLength {
                    expected: NODE_ID_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl FromStr for NodeId {
    type Err = IdentityError;

    /// Parse 64 hex characters, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| IdentityError::InvalidHex(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::LowerHex for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.to_hex())
    }
}

/// XOR distance between two node ids.
///
/// Ordering is numeric over the 256-bit big-endian value: a smaller
/// distance means closer in routing space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance([u8; NODE_ID_LENGTH]);

impl Distance {
    /// Wrap raw XOR bytes.
    pub fn new(bytes: [u8; NODE_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; NODE_ID_LENGTH] {
        &self.0
    }

    /// True when both ids were identical.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Index of the k-bucket a peer at this distance belongs to.
    ///
    /// Equals the number of shared leading bits, 0 (farthest) to 255.
    /// Identical ids also land in 255.
    pub fn bucket_index(&self) -> usize {
        leading_zero_bits(&self.0)
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance({})", hex::encode(self.0))
    }
}
