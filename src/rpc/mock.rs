// MockLedgerClient - Scripted in-memory node
// Behaves like a single account on a chain that enforces nonces; failures can be injected per recipient

use crate::identity::Address;
use crate::rpc::{CallRequest, LedgerClient, RpcError, SubmitError, TxReceipt};
use crate::tx::{decode_token_call, SignedTransaction, TxHash};
use alloy_primitives::U256;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A transaction the mock node accepted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedTransaction {
    pub recipient: Address,
    pub amount: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub hash: TxHash,
}

#[derive(Default)]
struct MockState {
    expected_nonce: u64,
    conflicts_remaining: usize,
    estimate_failures: HashMap<Address, RpcError>,
    submit_failures: HashMap<Address, SubmitError>,
    gas_price_failure: Option<RpcError>,
    decimals_failure: Option<RpcError>,
    gas_prices: VecDeque<u64>,
    accepted: Vec<AcceptedTransaction>,
    submit_attempts: Vec<(Address, u64)>,
    estimate_calls: usize,
    sequence_queries: usize,
    decimals_calls: usize,
}

/// Mock implementation of LedgerClient for testing
pub struct MockLedgerClient {
    decimals: u8,
    chain_id: u64,
    gas_limit: u64,
    gas_price: u64,
    state: Mutex<MockState>,
}

impl MockLedgerClient {
    /// Create a mock node: 18 decimals, chain id 1337, nonce 0
    pub fn new() -> Self {
        Self {
            decimals: 18,
            chain_id: 1337,
            gas_limit: 60_000,
            gas_price: 1_000_000_000,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Set the token's decimal precision
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the chain id
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the account's starting nonce
    pub fn with_nonce(self, nonce: u64) -> Self {
        self.lock().expected_nonce = nonce;
        self
    }

    /// Set the gas estimate returned for every call
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Set the default gas price
    pub fn with_gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Gas prices returned by successive `gas_price` calls before falling back to the default
    pub fn with_gas_price_sequence(self, prices: &[u64]) -> Self {
        self.lock().gas_prices = prices.iter().copied().collect();
        self
    }

    /// Reject the next `count` submissions with a nonce conflict. Each rejection
    /// also consumes one nonce, as if another transaction from the same account
    /// took the slot.
    pub fn with_conflicts(self, count: usize) -> Self {
        self.lock().conflicts_remaining = count;
        self
    }

    /// Fail gas estimation for calls addressed to `recipient`
    pub fn with_estimate_failure(self, recipient: Address, error: RpcError) -> Self {
        self.lock().estimate_failures.insert(recipient, error);
        self
    }

    /// Fail submission of transactions addressed to `recipient`
    pub fn with_submit_failure(self, recipient: Address, error: SubmitError) -> Self {
        self.lock().submit_failures.insert(recipient, error);
        self
    }

    /// Fail every `gas_price` call
    pub fn with_gas_price_failure(self, error: RpcError) -> Self {
        self.lock().gas_price_failure = Some(error);
        self
    }

    /// Fail the `asset_decimals` call
    pub fn with_decimals_failure(self, error: RpcError) -> Self {
        self.lock().decimals_failure = Some(error);
        self
    }

    /// Simulate transactions sent from the same account by someone else
    pub fn bump_nonce(&self, by: u64) {
        self.lock().expected_nonce += by;
    }

    /// Transactions accepted so far, in order
    pub fn accepted(&self) -> Vec<AcceptedTransaction> {
        self.lock().accepted.clone()
    }

    /// Every submission attempt as (recipient, nonce), accepted or not
    pub fn submit_attempts(&self) -> Vec<(Address, u64)> {
        self.lock().submit_attempts.clone()
    }

    /// Number of accepted transactions addressed to `recipient`
    pub fn accepted_for(&self, recipient: &Address) -> usize {
        self.lock()
            .accepted
            .iter()
            .filter(|tx| &tx.recipient == recipient)
            .count()
    }

    /// Number of `estimate_gas` calls
    pub fn estimate_calls(&self) -> usize {
        self.lock().estimate_calls
    }

    /// Number of `sequence_number` calls
    pub fn sequence_queries(&self) -> usize {
        self.lock().sequence_queries
    }

    /// Number of `asset_decimals` calls
    pub fn decimals_calls(&self) -> usize {
        self.lock().decimals_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

fn recipient_of(data: &[u8]) -> Option<(Address, U256)> {
    decode_token_call(data).map(|(_, recipient, amount)| (recipient, amount))
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn sequence_number(&self, _address: &Address) -> Result<u64, RpcError> {
        let mut state = self.lock();
        state.sequence_queries += 1;
        Ok(state.expected_nonce)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RpcError> {
        let mut state = self.lock();
        state.estimate_calls += 1;
        let (recipient, _) = recipient_of(&call.data)
            .ok_or_else(|| RpcError::Node {
                code: 3,
                message: "execution reverted: unknown call".to_string(),
            })?;
        match state.estimate_failures.get(&recipient) {
            Some(err) => Err(err.clone()),
            None => Ok(self.gas_limit),
        }
    }

    async fn gas_price(&self) -> Result<u64, RpcError> {
        let mut state = self.lock();
        if let Some(err) = &state.gas_price_failure {
            return Err(err.clone());
        }
        Ok(state.gas_prices.pop_front().unwrap_or(self.gas_price))
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<TxReceipt, SubmitError> {
        let mut state = self.lock();
        let unsigned = tx.tx();
        let (recipient, amount) = recipient_of(unsigned.data())
            .ok_or_else(|| RpcError::MalformedResponse("unknown call".to_string()))?;
        state.submit_attempts.push((recipient, unsigned.nonce()));

        if unsigned.chain_id() != self.chain_id {
            return Err(SubmitError::Rpc(RpcError::Node {
                code: -32000,
                message: "invalid chain id for signer".to_string(),
            }));
        }

        if state.conflicts_remaining > 0 {
            state.conflicts_remaining -= 1;
            state.expected_nonce += 1;
            return Err(SubmitError::SequenceConflict(format!(
                "nonce too low: next nonce {}, tx nonce {}",
                state.expected_nonce,
                unsigned.nonce()
            )));
        }

        if unsigned.nonce() != state.expected_nonce {
            return Err(SubmitError::SequenceConflict(format!(
                "invalid nonce: expected {}, got {}",
                state.expected_nonce,
                unsigned.nonce()
            )));
        }

        if let Some(err) = state.submit_failures.get(&recipient) {
            return Err(err.clone());
        }

        state.expected_nonce += 1;
        let hash = tx.hash();
        state.accepted.push(AcceptedTransaction {
            recipient,
            amount,
            nonce: unsigned.nonce(),
            gas_limit: unsigned.gas_limit(),
            gas_price: unsigned.gas_price(),
            hash,
        });

        Ok(TxReceipt {
            hash,
            block_number: Some(state.accepted.len() as u64),
            gas_used: Some(self.gas_limit),
        })
    }

    async fn asset_decimals(&self, _asset: &Address) -> Result<u8, RpcError> {
        let mut state = self.lock();
        state.decimals_calls += 1;
        match &state.decimals_failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.decimals),
        }
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(self.chain_id)
    }
}
