use crate::identity::{address_of_public_key, Address, Keypair};
use crate::tx::{SignedTransaction, UnsignedTransaction};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Invalid transaction payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// EIP-155 transaction signing
pub struct Signer;

impl Signer {
    /// Sign a transaction with the sender's keypair.
    ///
    /// `v` is `recovery_id + 35 + 2 * chain_id`, binding the signature to one chain.
    pub fn sign(
        tx: &UnsignedTransaction,
        keypair: &Keypair,
    ) -> Result<SignedTransaction, SigningError> {
        if tx.chain_id() == 0 {
            return Err(SigningError::InvalidPayload(
                "chain id must be non-zero".to_string(),
            ));
        }

        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(tx.signing_hash());
        let signature = secp.sign_ecdsa_recoverable(&message, keypair.secret_key());
        let (recovery_id, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        let v = tx
            .chain_id()
            .checked_mul(2)
            .and_then(|v| v.checked_add(35 + recovery_id.to_i32() as u64))
            .ok_or_else(|| SigningError::InvalidPayload("chain id too large".to_string()))?;
        Ok(SignedTransaction::from_parts(tx.clone(), v, r, s))
    }

    /// Recover the address that signed `signed`
    pub fn recover(signed: &SignedTransaction) -> Result<Address, SigningError> {
        let tx = signed.tx();
        let v_base = tx.chain_id().saturating_mul(2).saturating_add(35);
        let recovery = signed
            .v()
            .checked_sub(v_base)
            .filter(|id| *id <= 3)
            .ok_or_else(|| {
                SigningError::InvalidSignature(format!(
                    "v = {} does not match chain id {}",
                    signed.v(),
                    tx.chain_id()
                ))
            })?;

        let recovery_id = RecoveryId::from_i32(recovery as i32)
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(signed.r());
        compact[32..].copy_from_slice(signed.s());

        let signature = RecoverableSignature::from_compact(&compact, recovery_id)
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

        let secp = Secp256k1::verification_only();
        let message = Message::from_digest(tx.signing_hash());
        let public = secp
            .recover_ecdsa(&message, &signature)
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

        Ok(address_of_public_key(
            &public.serialize_uncompressed(),
        ))
    }
}
