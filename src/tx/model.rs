use crate::identity::{keccak256, Address};
use crate::tx::RlpList;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Transaction hash (keccak256 of the raw signed bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a `0x` prefixed hex hash
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TxHash::from_hex(&s).ok_or_else(|| serde::de::Error::custom("expected 32-byte hex hash"))
    }
}

/// A legacy (type 0) transaction before signing.
///
/// Built fresh for every submission attempt; a new sequence number means a new
/// transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    nonce: u64,
    gas_price: u64,
    gas_limit: u64,
    to: Address,
    value: u128,
    data: Vec<u8>,
    chain_id: u64,
}

impl UnsignedTransaction {
    /// Create a new unsigned transaction
    pub fn new(
        nonce: u64,
        gas_price: u64,
        gas_limit: u64,
        to: Address,
        value: u128,
        data: Vec<u8>,
        chain_id: u64,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            chain_id,
        }
    }

    /// Get the sequence number
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Get the price per gas unit
    pub fn gas_price(&self) -> u64 {
        self.gas_price
    }

    /// Get the gas limit
    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Get the destination (the token contract)
    pub fn to(&self) -> &Address {
        &self.to
    }

    /// Get the native value attached
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Get the call payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the chain id the signature is bound to
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn append_fields(&self, list: &mut RlpList) {
        list.append_u64(self.nonce)
            .append_u64(self.gas_price)
            .append_u64(self.gas_limit)
            .append_bytes(self.to.as_slice())
            .append_u128(self.value)
            .append_bytes(&self.data);
    }

    /// EIP-155 signing payload: the six fields followed by (chain_id, 0, 0)
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut list = RlpList::new();
        self.append_fields(&mut list);
        list.append_u64(self.chain_id).append_u64(0).append_u64(0);
        list.finish()
    }

    /// Hash that gets signed
    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&self.signing_payload())
    }
}

/// A signed transaction, ready for broadcast
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: UnsignedTransaction,
    v: u64,
    r: [u8; 32],
    s: [u8; 32],
}

impl SignedTransaction {
    /// Create a SignedTransaction from parts
    pub fn from_parts(tx: UnsignedTransaction, v: u64, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { tx, v, r, s }
    }

    /// Get the underlying unsigned transaction
    pub fn tx(&self) -> &UnsignedTransaction {
        &self.tx
    }

    pub fn v(&self) -> u64 {
        self.v
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Raw RLP bytes as accepted by `eth_sendRawTransaction`
    pub fn raw(&self) -> Vec<u8> {
        let mut list = RlpList::new();
        self.tx.append_fields(&mut list);
        list.append_u64(self.v)
            .append_scalar(&self.r)
            .append_scalar(&self.s);
        list.finish()
    }

    /// `0x` prefixed hex of [`raw`](Self::raw)
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(self.raw()))
    }

    /// Transaction hash
    pub fn hash(&self) -> TxHash {
        TxHash(keccak256(&self.raw()))
    }
}
