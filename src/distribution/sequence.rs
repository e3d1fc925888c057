// Sequence Tracker - The sender's next usable nonce
//
// Queried once at start, advanced locally after each confirmed submission and
// only re-queried after the node rejects a nonce.

use crate::identity::Address;
use crate::rpc::{LedgerClient, RpcError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns the cached sequence number of the sending account
pub struct SequenceTracker {
    client: Arc<dyn LedgerClient>,
    sender: Address,
    current: u64,
    /// Lowest value `current` may take: one past the last confirmed nonce
    floor: u64,
    refreshes: u32,
}

impl SequenceTracker {
    /// Query the live sequence number and start tracking from it
    pub async fn start(client: Arc<dyn LedgerClient>, sender: Address) -> Result<Self, RpcError> {
        let current = client.sequence_number(&sender).await?;
        debug!(sender = %sender, nonce = current, "Sequence tracker started");
        Ok(Self {
            client,
            sender,
            current,
            floor: 0,
            refreshes: 0,
        })
    }

    /// The sending account
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    /// Cached next sequence number
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Number of live re-queries since start
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    /// Discard the cached value and query the node again.
    ///
    /// Never moves below a nonce this tracker already saw confirmed, so
    /// confirmed submissions keep strictly increasing nonces even if the node
    /// briefly lags.
    pub async fn refresh(&mut self) -> Result<u64, RpcError> {
        let live = self.client.sequence_number(&self.sender).await?;
        self.refreshes += 1;

        if live < self.floor {
            warn!(
                live,
                floor = self.floor,
                "Node reported a nonce below one already confirmed, keeping the floor"
            );
        }
        let previous = self.current;
        self.current = live.max(self.floor);
        debug!(previous, current = self.current, "Sequence refreshed");
        Ok(self.current)
    }

    /// Mark the current sequence number as consumed and move to the next one
    pub fn advance(&mut self) -> u64 {
        self.current += 1;
        self.floor = self.current;
        self.current
    }
}
