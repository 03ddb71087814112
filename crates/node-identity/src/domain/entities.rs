//! Core Domain Entities for Node Identity

use std::cmp::Ordering;
use std::fmt;

use shared_crypto::{Address, Secp256k1KeyPair, Secp256k1PublicKey};

use crate::domain::services::{cmp_by_distance, constant_time_eq, leading_zero_bits, xor_bytes};
use crate::domain::{Distance, NodeId};

/// The identity of an overlay participant.
///
/// Built only from a public key, so the three components always belong to
/// the same key:
///
/// ```text
/// public_key ──Keccak256(uncompressed[1..])[12..]──▶ address ──Keccak256──▶ node_id
/// ```
///
/// Immutable after construction and cheap to clone; share it read-only with
/// every routing component. No `Default`: an all-zero
/// identity is never a valid participant.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    node_id: NodeId,
    address: Address,
    public_key: Secp256k1PublicKey,
}

impl Identity {
    /// Derive the identity belonging to a public key.
    pub fn from_public_key(public_key: Secp256k1PublicKey) -> Self {
        let address = Address::from_public_key(&public_key);
        let node_id = NodeId::from_address(&address);
        Self {
            node_id,
            address,
            public_key,
        }
    }

    /// Derive the identity of a keypair's public half.
    pub fn from_keypair(keypair: &Secp256k1KeyPair) -> Self {
        Self::from_public_key(keypair.public_key())
    }

    /// The routing-space coordinate.
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// The network address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The public key, for signature verification by collaborators.
    pub fn public_key(&self) -> &Secp256k1PublicKey {
        &self.public_key
    }

    /// True iff `other` is byte-for-byte this node's id.
    ///
    /// A sequence of any other length is never equal.
    pub fn equals(&self, other: &[u8]) -> bool {
        constant_time_eq(self.node_id.as_bytes(), other)
    }

    /// XOR distance between this node's id and arbitrary peer-supplied bytes.
    ///
    /// Always 32 bytes long. Bytes past the end of a short `other` are zero;
    /// extra bytes of a long `other` are ignored. Use [`Self::distance_to`]
    /// when the peer id has already been validated.
    pub fn xor_distance(&self, other: &[u8]) -> Vec<u8> {
        xor_bytes(self.node_id.as_bytes(), other)
    }

    /// Lowercase hex of the 20-byte address.
    pub fn address_hex(&self) -> String {
        self.address.to_hex()
    }

    /// Lowercase hex of the 32-byte node id.
    pub fn id_hex(&self) -> String {
        self.node_id.to_hex()
    }

    /// Leading zero bits of the node id.
    ///
    /// An all-zero id reports 255, not 256.
    pub fn prefix_len(&self) -> usize {
        leading_zero_bits(self.node_id.as_bytes())
    }

    /// Typed XOR distance to a validated peer id.
    pub fn distance_to(&self, other: &NodeId) -> Distance {
        self.node_id.distance(other)
    }

    /// k-bucket index for a peer, relative to this node.
    pub fn bucket_index(&self, other: &NodeId) -> usize {
        self.distance_to(other).bucket_index()
    }

    /// Order two peers by closeness to this node (closest first).
    pub fn cmp_distance(&self, a: &NodeId, b: &NodeId) -> Ordering {
        cmp_by_distance(a, b, &self.node_id)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("node_id", &self.node_id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node_id, self.address)
    }
}
