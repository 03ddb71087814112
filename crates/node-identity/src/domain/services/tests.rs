//! Tests for Domain Services - XOR metric and prefix length

use super::*;

fn make_node_id(first_byte: u8) -> NodeId {
    let mut bytes = [0u8; 32];
    bytes[0] = first_byte;
    NodeId::new(bytes)
}

// =============================================================================
// Test Group 1: XOR over raw bytes
// =============================================================================

#[test]
fn test_xor_bytes_is_symmetric_for_equal_lengths() {
    let a = [0xA5u8, 0x0F, 0x33, 0xC8];
    let b = [0x5Au8, 0xF0, 0x31, 0x08];

    assert_eq!(xor_bytes(&a, &b), xor_bytes(&b, &a));
    assert_eq!(xor_bytes(&a, &b), vec![0xFF, 0xFF, 0x02, 0xC0]);
}

#[test]
fn test_xor_bytes_with_self_is_zero() {
    let a = [0xDEu8; 32];
    assert!(xor_bytes(&a, &a).iter().all(|b| *b == 0));
}

#[test]
fn test_xor_bytes_short_remote_leaves_tail_zero() {
    let local = [0xFFu8; 4];
    let remote = [0x0Fu8; 2];

    let result = xor_bytes(&local, &remote);

    assert_eq!(result, vec![0xF0, 0xF0, 0x00, 0x00]);
}

#[test]
fn test_xor_bytes_long_remote_is_truncated() {
    let local = [0x01u8; 2];
    let remote = [0x03u8; 5];

    assert_eq!(xor_bytes(&local, &remote), vec![0x02, 0x02]);
}

#[test]
fn test_xor_bytes_empty_remote() {
    assert_eq!(xor_bytes(&[1, 2, 3], &[]), vec![0, 0, 0]);
}

// =============================================================================
// Test Group 2: Leading zero bits (prefix length)
// =============================================================================

#[test]
fn test_leading_zero_bits_first_byte_set() {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xFF;
    assert_eq!(leading_zero_bits(&bytes), 0);
}

#[test]
fn test_leading_zero_bits_second_byte() {
    let mut bytes = [0xAAu8; 32];
    bytes[0] = 0x00;
    bytes[1] = 0x0F;
    assert_eq!(leading_zero_bits(&bytes), 12);
}

#[test]
fn test_leading_zero_bits_every_position_in_byte() {
    for shift in 0..8 {
        let mut bytes = [0u8; 32];
        bytes[3] = 0x80 >> shift;
        assert_eq!(leading_zero_bits(&bytes), 24 + shift);
    }
}

#[test]
fn test_leading_zero_bits_last_bit_only() {
    let mut bytes = [0u8; 32];
    bytes[31] = 0x01;
    assert_eq!(leading_zero_bits(&bytes), 255);
}

#[test]
fn test_leading_zero_bits_all_zero_reports_one_short() {
    assert_eq!(leading_zero_bits(&[0u8; 32]), 255);
    assert_eq!(leading_zero_bits(&[0u8; 20]), 159);
    assert_eq!(leading_zero_bits(&[0u8; 1]), 7);
}

#[test]
fn test_leading_zero_bits_empty() {
    assert_eq!(leading_zero_bits(&[]), 0);
}

#[test]
fn test_leading_zero_bits_monotonic_as_prefix_zeroed() {
    let mut bytes = [0xFFu8; 32];
    let mut previous = leading_zero_bits(&bytes);
    for i in 0..32 {
        bytes[i] = 0;
        let current = leading_zero_bits(&bytes);
        assert!(current >= previous, "prefix length decreased at byte {i}");
        previous = current;
    }
}

// =============================================================================
// Test Group 3: Equality
// =============================================================================

#[test]
fn test_constant_time_eq() {
    assert!(constant_time_eq(&[1, 2, 3], &[1, 2, 3]));
    assert!(!constant_time_eq(&[1, 2, 3], &[1, 2, 4]));
    assert!(!constant_time_eq(&[1, 2, 3], &[1, 2]));
    assert!(!constant_time_eq(&[0, 0], &[0, 0, 0]));
    assert!(constant_time_eq(&[], &[]));
}

// =============================================================================
// Test Group 4: Closest-id ordering
// =============================================================================

#[test]
fn test_sort_by_distance_closest_first() {
    let target = make_node_id(0b0000_0000);
    let ids = vec![
        make_node_id(0b1000_0000),
        make_node_id(0b0000_0001),
        make_node_id(0b0100_0000),
    ];

    let sorted = sort_by_distance(&ids, &target);

    assert_eq!(sorted[0], make_node_id(0b0000_0001));
    assert_eq!(sorted[1], make_node_id(0b0100_0000));
    assert_eq!(sorted[2], make_node_id(0b1000_0000));
}

#[test]
fn test_find_k_closest_limits_results() {
    let target = make_node_id(0x10);
    let ids: Vec<NodeId> = (0..10).map(|i| make_node_id(i * 16)).collect();

    let closest = find_k_closest(&ids, &target, 3);

    assert_eq!(closest.len(), 3);
    assert_eq!(closest[0], target);
}

#[test]
fn test_find_k_closest_with_fewer_ids_than_k() {
    let target = make_node_id(0);
    let ids = vec![make_node_id(1), make_node_id(2)];
    assert_eq!(find_k_closest(&ids, &target, 20).len(), 2);
}

#[test]
fn test_cmp_by_distance() {
    let target = make_node_id(0xF0);
    let near = make_node_id(0xF1);
    let far = make_node_id(0x0F);
    assert_eq!(cmp_by_distance(&near, &far, &target), Ordering::Less);
    assert_eq!(cmp_by_distance(&far, &near, &target), Ordering::Greater);
    assert_eq!(cmp_by_distance(&near, &near, &target), Ordering::Equal);
}
