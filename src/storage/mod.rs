// Storage module - THE DELIVERY LEDGER
// Durable record of which recipients have already been serviced

mod json_file;
mod store;

pub use json_file::JsonFileLedger;
pub use store::SledLedger;

use crate::identity::{Address, AddressError};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from delivery ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed ledger contents: {0}")]
    Malformed(String),

    #[error("Database operation failed: {0}")]
    Database(String),

    #[error("Invalid address at entry {index}: {source}")]
    InvalidAddress {
        index: usize,
        #[source]
        source: AddressError,
    },
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Database(err.to_string())
    }
}

/// Persistent set of serviced recipients.
///
/// Append-only: entries are never removed. `record` is durable by the time it
/// returns `Ok`; a failed `record` leaves both the persisted and the in-memory
/// state as they were.
pub trait DeliveryLedger: Send {
    /// Read persisted state (creating empty storage if none exists) and cache it
    fn load(&mut self) -> Result<HashSet<Address>, LedgerError>;

    /// Read persisted state without creating anything when none exists
    fn load_existing(&mut self) -> Result<HashSet<Address>, LedgerError> {
        self.load()
    }

    /// Whether `recipient` has already been serviced
    fn has(&self, recipient: &Address) -> bool;

    /// Durably add `recipient`; a no-op if it is already present
    fn record(&mut self, recipient: &Address) -> Result<(), LedgerError>;

    /// Serviced recipients in the order they were recorded
    fn delivered(&self) -> Vec<Address>;
}
