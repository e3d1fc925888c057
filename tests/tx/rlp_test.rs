// RLP Tests
// Tests for the recursive length prefix encoding used on the wire

use dripmint::tx::{encode_bytes, RlpList};

#[test]
fn test_cat_dog_list() {
    let encoded = RlpList::new().append_bytes(b"cat").append_bytes(b"dog").finish();
    assert_eq!(hex::encode(encoded), "c88363617483646f67");
}

#[test]
fn test_long_string_prefix() {
    let mut out = Vec::new();
    encode_bytes(&[0xaa; 60], &mut out);
    assert_eq!(&out[..2], &[0xb8, 60]);
    assert_eq!(out.len(), 62);
}

#[test]
fn test_integers_are_minimal() {
    let encoded = RlpList::new()
        .append_u64(0)
        .append_u64(127)
        .append_u64(128)
        .append_u128(1_000_000_000_000_000_000)
        .finish();
    assert_eq!(hex::encode(encoded), "cd807f8180880de0b6b3a7640000");
}

#[test]
fn test_scalar_strips_leading_zeros() {
    let mut word = [0u8; 32];
    word[31] = 0x25;
    let encoded = RlpList::new().append_scalar(&word).finish();
    assert_eq!(encoded, vec![0xc1, 0x25]);
}
