// LedgerClient - The capabilities the distribution engine needs from a node

use crate::identity::Address;
use crate::rpc::{RpcError, SubmitError};
use crate::tx::{SignedTransaction, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A read-only contract call, used for gas estimation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
}

/// Outcome of a mined, successful transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

impl TxReceipt {
    /// A receipt carrying only the hash
    pub fn new(hash: TxHash) -> Self {
        Self {
            hash,
            block_number: None,
            gas_used: None,
        }
    }
}

/// Remote ledger node
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Next sequence number for `address`, counting pending transactions
    async fn sequence_number(&self, address: &Address) -> Result<u64, RpcError>;

    /// Gas needed to execute `call`
    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RpcError>;

    /// Current price per gas unit
    async fn gas_price(&self) -> Result<u64, RpcError>;

    /// Broadcast `tx` and wait until it is mined successfully
    async fn submit(&self, tx: &SignedTransaction) -> Result<TxReceipt, SubmitError>;

    /// Decimal precision of the token at `asset`
    async fn asset_decimals(&self, asset: &Address) -> Result<u8, RpcError>;

    /// Chain id used for replay protection
    async fn chain_id(&self) -> Result<u64, RpcError>;
}
