//! Domain Services - Pure functions over identifier bytes
//!
//! All functions in this module are pure (no I/O, no state mutation)
//! and deterministic (same inputs → same outputs). Every participant must
//! compute these bit-for-bit identically or routing tables diverge.

use std::cmp::Ordering;

use crate::domain::NodeId;

/// XOR two byte sequences, sized to `local`.
///
/// `out[i] = local[i] ^ remote[i]` for every index both sides have. When
/// `remote` is shorter, the remaining output bytes stay zero; when it is
/// longer, its extra bytes are ignored. Callers that need a strict length
/// check should parse into [`NodeId`] first.
pub fn xor_bytes(local: &[u8], remote: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; local.len()];
    for (out, (a, b)) in result.iter_mut().zip(local.iter().zip(remote.iter())) {
        *out = a ^ b;
    }
    result
}

/// Count leading zero bits, scanning from the most significant bit of the
/// first byte.
///
/// An all-zero input reports `8 * len - 1`, one short of its bit length.
/// Deployed nodes bucket on this value, so the boundary is kept as is.
/// An empty input reports 0.
pub fn leading_zero_bits(bytes: &[u8]) -> usize {
    for (i, b) in bytes.iter().enumerate() {
        if *b != 0 {
            return i * 8 + b.leading_zeros() as usize;
        }
    }
    (bytes.len() * 8).saturating_sub(1)
}

/// Byte equality whose running time depends only on the lengths.
///
/// Sequences of different length are never equal.
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Order two ids by their distance to `target` (closest first).
pub fn cmp_by_distance(a: &NodeId, b: &NodeId, target: &NodeId) -> Ordering {
    a.distance(target).cmp(&b.distance(target))
}

/// Sort ids by XOR distance to a target, closest first.
pub fn sort_by_distance(ids: &[NodeId], target: &NodeId) -> Vec<NodeId> {
    let mut sorted = ids.to_vec();
    sorted.sort_by(|a, b| cmp_by_distance(a, b, target));
    sorted
}

/// Find the k closest ids to a target.
///
/// # Returns
/// Up to k ids sorted by distance (closest first)
pub fn find_k_closest(ids: &[NodeId], target: &NodeId, k: usize) -> Vec<NodeId> {
    sort_by_distance(ids, target).into_iter().take(k).collect()
}

#[cfg(test)]
mod tests;
