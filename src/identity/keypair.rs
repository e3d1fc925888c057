use crate::identity::{address_of_public_key, Address};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeypairError {
    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Invalid key hex: {0}")]
    InvalidHex(String),

    #[error("Invalid key bytes: {0}")]
    InvalidBytes(String),
}

/// secp256k1 keypair of the sending account.
///
/// The secret never leaves this type except through `signer`; `Debug` only
/// shows the derived address.
#[derive(Clone)]
pub struct Keypair {
    secret: SecretKey,
    address: Address,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let secret = SecretKey::new(&mut secp256k1::rand::thread_rng());
        Self::from_secret(secret)
    }

    /// Create a keypair from the 32 secret key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        if bytes.len() != 32 {
            return Err(KeypairError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }

        let secret =
            SecretKey::from_slice(bytes).map_err(|e| KeypairError::InvalidBytes(e.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    /// Create a keypair from a hex encoded secret key (optional `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self, KeypairError> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| KeypairError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    fn from_secret(secret: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let address = address_of_public_key(&public.serialize_uncompressed());
        Self { secret, address }
    }

    /// The account address controlled by this keypair
    pub fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &format_args!("{}", self.address))
            .finish_non_exhaustive()
    }
}
