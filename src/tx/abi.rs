// ABI - Call payload encoding for the token contract
// Static arguments only: every call here takes (address, uint256) or nothing

use crate::identity::{address_from_slice, keccak256, Address};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const WORD: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Unknown token call: {0} (expected 'mint' or 'transfer')")]
    UnknownCall(String),

    #[error("Return data too short: expected {expected} bytes, got {got}")]
    ShortReturn { expected: usize, got: usize },

    #[error("Return value out of range for {0}")]
    OutOfRange(&'static str),
}

/// First four bytes of the keccak hash of a function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// The token method invoked for each recipient
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCall {
    /// `mint(address,uint256)`: sender must hold the minter role
    #[default]
    Mint,
    /// `transfer(address,uint256)`: sender pays out of its own balance
    Transfer,
}

impl TokenCall {
    /// Solidity signature of the method
    pub fn signature(&self) -> &'static str {
        match self {
            TokenCall::Mint => "mint(address,uint256)",
            TokenCall::Transfer => "transfer(address,uint256)",
        }
    }

    /// 4-byte method selector
    pub fn selector(&self) -> [u8; 4] {
        selector(self.signature())
    }

    /// Encode the call: selector, recipient word, amount word
    pub fn encode(&self, recipient: &Address, amount: U256) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + 2 * WORD);
        data.extend_from_slice(&self.selector());
        data.extend_from_slice(&address_word(recipient));
        data.extend_from_slice(&amount.to_be_bytes::<WORD>());
        data
    }
}

impl fmt::Display for TokenCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenCall::Mint => f.write_str("mint"),
            TokenCall::Transfer => f.write_str("transfer"),
        }
    }
}

impl FromStr for TokenCall {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mint" => Ok(TokenCall::Mint),
            "transfer" => Ok(TokenCall::Transfer),
            other => Err(AbiError::UnknownCall(other.to_string())),
        }
    }
}

/// Payload for `decimals()`
pub fn decimals_call() -> Vec<u8> {
    selector("decimals()").to_vec()
}

/// Decode the `uint8` returned by `decimals()`
pub fn decode_decimals(data: &[u8]) -> Result<u8, AbiError> {
    if data.len() < WORD {
        return Err(AbiError::ShortReturn {
            expected: WORD,
            got: data.len(),
        });
    }
    let word = &data[..WORD];
    if word[..WORD - 1].iter().any(|b| *b != 0) {
        return Err(AbiError::OutOfRange("uint8"));
    }
    Ok(word[WORD - 1])
}

/// Recover (recipient, amount) from a payload produced by [`TokenCall::encode`]
pub fn decode_token_call(data: &[u8]) -> Option<(TokenCall, Address, U256)> {
    if data.len() != 4 + 2 * WORD {
        return None;
    }
    let call = [TokenCall::Mint, TokenCall::Transfer]
        .into_iter()
        .find(|c| c.selector() == data[..4])?;

    let recipient_word = &data[4..4 + WORD];
    if recipient_word[..12].iter().any(|b| *b != 0) {
        return None;
    }
    let recipient = address_from_slice(&recipient_word[12..]).ok()?;

    let amount = U256::try_from_be_slice(&data[4 + WORD..])?;

    Some((call, recipient, amount))
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_slice());
    word
}
