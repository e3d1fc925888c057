// JsonFileLedger - Delivery ledger kept as a JSON array of addresses
//
// Every write replaces the whole file through a temporary sibling and an atomic
// rename, so a reader only ever sees the old list or the new one.

use super::{DeliveryLedger, LedgerError};
use crate::identity::{checksum, parse_address, Address};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed delivery ledger
pub struct JsonFileLedger {
    path: PathBuf,
    order: Vec<Address>,
    set: HashSet<Address>,
    loaded: bool,
}

impl JsonFileLedger {
    /// Create a ledger for `path`. Nothing is read until [`load`](DeliveryLedger::load).
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            order: Vec::new(),
            set: HashSet::new(),
            loaded: false,
        }
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_file(&self) -> Result<Vec<Address>, LedgerError> {
        let bytes = fs::read(&self.path)?;
        let entries: Vec<String> =
            serde_json::from_slice(&bytes).map_err(|e| LedgerError::Malformed(e.to_string()))?;

        entries
            .iter()
            .enumerate()
            .map(|(index, s)| {
                parse_address(s).map_err(|source| LedgerError::InvalidAddress { index, source })
            })
            .collect()
    }

    fn write_file(&self, entries: &[Address]) -> Result<(), LedgerError> {
        let strings: Vec<String> = entries.iter().map(checksum).collect();
        let json = serde_json::to_vec_pretty(&strings)
            .map_err(|e| LedgerError::Malformed(e.to_string()))?;

        let temp = self.temp_path();
        {
            let mut file = File::create(&temp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        sync_parent_dir(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), LedgerError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        File::open(dir)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), LedgerError> {
    Ok(())
}

impl DeliveryLedger for JsonFileLedger {
    fn load(&mut self) -> Result<HashSet<Address>, LedgerError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No delivery ledger found, starting empty");
            self.write_file(&[])?;
        }
        self.load_existing()
    }

    fn load_existing(&mut self) -> Result<HashSet<Address>, LedgerError> {
        let entries = if self.path.exists() {
            self.read_file()?
        } else {
            Vec::new()
        };

        self.order.clear();
        self.set.clear();
        for address in entries {
            if self.set.insert(address) {
                self.order.push(address);
            }
        }
        self.loaded = true;

        debug!(path = %self.path.display(), entries = self.order.len(), "Delivery ledger loaded");
        Ok(self.set.clone())
    }

    fn has(&self, recipient: &Address) -> bool {
        self.set.contains(recipient)
    }

    fn record(&mut self, recipient: &Address) -> Result<(), LedgerError> {
        if !self.loaded {
            self.load()?;
        }
        if self.set.contains(recipient) {
            return Ok(());
        }

        let mut next = self.order.clone();
        next.push(*recipient);
        self.write_file(&next)?;

        self.order = next;
        self.set.insert(*recipient);
        Ok(())
    }

    fn delivered(&self) -> Vec<Address> {
        self.order.clone()
    }
}
