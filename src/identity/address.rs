// Address - Account identifiers
// 20-byte addresses come from alloy-primitives; this module adds lenient parsing and keccak

use sha3::{Digest, Keccak256};
use thiserror::Error;

pub use alloy_primitives::Address;

const ADDRESS_HEX_LEN: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address length: expected 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),
}

/// Keccak-256 digest of `data`
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// Parse an address from hex, with or without a `0x`/`0X` prefix, in any letter case.
///
/// The EIP-55 checksum is not enforced: lists produced by other tools are often lowercase.
pub fn parse_address(s: &str) -> Result<Address, AddressError> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.len() != ADDRESS_HEX_LEN {
        return Err(AddressError::InvalidLength(digits.len()));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
    Ok(Address::new(bytes))
}

/// Address from a raw 20-byte slice, as stored in sled keys and ABI words
pub fn address_from_slice(bytes: &[u8]) -> Result<Address, AddressError> {
    let arr: [u8; 20] = bytes
        .try_into()
        .map_err(|_| AddressError::InvalidLength(bytes.len() * 2))?;
    Ok(Address::new(arr))
}

/// Address of an uncompressed secp256k1 public key (65 bytes, 0x04 prefix)
pub fn address_of_public_key(key: &[u8; 65]) -> Address {
    let hash = keccak256(&key[1..]);
    Address::from_slice(&hash[12..])
}

/// EIP-55 checksummed hex string, `0x` prefixed
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}
