// SledLedger - Delivery ledger on the sled embedded database
//
// Layout:
// - delivered:<20 address bytes> -> sled-generated id (u64, big-endian)
// The id is monotonic, which preserves recording order across restarts.

use super::{DeliveryLedger, LedgerError};
use crate::identity::{address_from_slice, Address};
use std::collections::HashSet;
use std::path::Path;

/// Key prefixes for organizing data
mod keys {
    pub const DELIVERED_PREFIX: &[u8] = b"delivered:";
}

fn delivered_key(address: &Address) -> Vec<u8> {
    [keys::DELIVERED_PREFIX, address.as_slice()].concat()
}

/// sled-backed delivery ledger
///
/// Uses sled for crash-safe, embedded storage. Each `record` is flushed
/// before it returns.
pub struct SledLedger {
    db: sled::Db,
    order: Vec<Address>,
    set: HashSet<Address>,
}

impl SledLedger {
    /// Open or create a ledger database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            order: Vec::new(),
            set: HashSet::new(),
        })
    }

    /// In-memory ledger that is discarded on drop
    pub fn temporary() -> Result<Self, LedgerError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self {
            db,
            order: Vec::new(),
            set: HashSet::new(),
        })
    }

    /// Number of recorded recipients on disk
    pub fn len(&self) -> usize {
        self.db.scan_prefix(keys::DELIVERED_PREFIX).count()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeliveryLedger for SledLedger {
    fn load(&mut self) -> Result<HashSet<Address>, LedgerError> {
        let mut entries = Vec::new();
        for result in self.db.scan_prefix(keys::DELIVERED_PREFIX) {
            let (key, value) = result?;
            let address = address_from_slice(&key[keys::DELIVERED_PREFIX.len()..])
                .map_err(|source| LedgerError::InvalidAddress {
                    index: entries.len(),
                    source,
                })?;
            let id: [u8; 8] = value
                .as_ref()
                .try_into()
                .map_err(|_| LedgerError::Malformed("invalid record id length".to_string()))?;
            entries.push((u64::from_be_bytes(id), address));
        }
        entries.sort_by_key(|(id, _)| *id);

        self.order = entries.into_iter().map(|(_, address)| address).collect();
        self.set = self.order.iter().copied().collect();
        Ok(self.set.clone())
    }

    fn has(&self, recipient: &Address) -> bool {
        self.set.contains(recipient)
    }

    fn record(&mut self, recipient: &Address) -> Result<(), LedgerError> {
        let key = delivered_key(recipient);
        if self.set.contains(recipient) || self.db.contains_key(&key)? {
            self.set.insert(*recipient);
            return Ok(());
        }

        let id = self.db.generate_id()?;
        self.db.insert(key, id.to_be_bytes().to_vec())?;
        self.db.flush()?;

        self.order.push(*recipient);
        self.set.insert(*recipient);
        Ok(())
    }

    fn delivered(&self) -> Vec<Address> {
        self.order.clone()
    }
}
