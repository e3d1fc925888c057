use crate::identity::Address;
use alloy_primitives::U256;
use crate::tx::{TokenCall, UnsignedTransaction};

/// Builds the per-recipient token transaction.
///
/// Configured once per run with the token contract and chain; `build` itself
/// does no I/O and always produces the same transaction for the same inputs.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    asset: Address,
    chain_id: u64,
    call: TokenCall,
}

impl TransactionBuilder {
    /// Create a builder for the given token contract and chain
    pub fn new(asset: Address, chain_id: u64) -> Self {
        Self {
            asset,
            chain_id,
            call: TokenCall::default(),
        }
    }

    /// Set which token method to invoke
    pub fn with_call(mut self, call: TokenCall) -> Self {
        self.call = call;
        self
    }

    /// Get the token contract
    pub fn asset(&self) -> &Address {
        &self.asset
    }

    /// Get the chain id
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the token method
    pub fn call(&self) -> TokenCall {
        self.call
    }

    /// Encoded call payload for `recipient` and `amount` (smallest unit).
    /// The same bytes are used for gas estimation and in the built transaction.
    pub fn call_data(&self, recipient: &Address, amount: U256) -> Vec<u8> {
        self.call.encode(recipient, amount)
    }

    /// Build the unsigned transaction
    pub fn build(
        &self,
        recipient: &Address,
        amount: U256,
        nonce: u64,
        gas_limit: u64,
        gas_price: u64,
    ) -> UnsignedTransaction {
        UnsignedTransaction::new(
            nonce,
            gas_price,
            gas_limit,
            self.asset,
            0,
            self.call_data(recipient, amount),
            self.chain_id,
        )
    }
}
