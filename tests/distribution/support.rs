// Shared fixtures for the distribution tests

use dripmint::distribution::{AmountPolicy, CancellationFlag, DistributorConfig};
use dripmint::identity::{Address, Keypair};
use dripmint::storage::{DeliveryLedger, JsonFileLedger, LedgerError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn token() -> Address {
    Address::new([0xcc; 20])
}

pub fn recipients(n: u8) -> Vec<Address> {
    (1..=n).map(|i| Address::new([i; 20])).collect()
}

/// Default config without the conflict back-off
pub fn config() -> DistributorConfig {
    DistributorConfig::new(token()).with_retry_delay_secs(0)
}

pub fn sender() -> Keypair {
    Keypair::from_hex("4646464646464646464646464646464646464646464646464646464646464646").unwrap()
}

pub fn json_ledger(path: &Path) -> Box<dyn DeliveryLedger> {
    Box::new(JsonFileLedger::new(path))
}

/// Addresses persisted in a JSON ledger file
pub fn persisted(path: &Path) -> Vec<Address> {
    let mut ledger = JsonFileLedger::new(path);
    ledger.load().unwrap();
    ledger.delivered()
}

/// JSON ledger whose `record` fails for one recipient
pub struct FailingLedger {
    inner: JsonFileLedger,
    fail_on: Address,
}

impl FailingLedger {
    pub fn new(path: &Path, fail_on: Address) -> Self {
        Self {
            inner: JsonFileLedger::new(path),
            fail_on,
        }
    }
}

impl DeliveryLedger for FailingLedger {
    fn load(&mut self) -> Result<HashSet<Address>, LedgerError> {
        self.inner.load()
    }

    fn load_existing(&mut self) -> Result<HashSet<Address>, LedgerError> {
        self.inner.load_existing()
    }

    fn has(&self, recipient: &Address) -> bool {
        self.inner.has(recipient)
    }

    fn record(&mut self, recipient: &Address) -> Result<(), LedgerError> {
        if recipient == &self.fail_on {
            return Err(LedgerError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no space left on device",
            )));
        }
        self.inner.record(recipient)
    }

    fn delivered(&self) -> Vec<Address> {
        self.inner.delivered()
    }
}

/// Fixed amount that counts how often it was asked
pub struct CountingAmount {
    pub amount: u64,
    pub calls: Arc<AtomicUsize>,
}

impl AmountPolicy for CountingAmount {
    fn select(&mut self, _recipient: &Address) -> u64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.amount
    }
}

/// Requests cancellation while `trigger` is being serviced
pub struct CancelDuring {
    pub trigger: Address,
    pub flag: CancellationFlag,
}

impl AmountPolicy for CancelDuring {
    fn select(&mut self, recipient: &Address) -> u64 {
        if recipient == &self.trigger {
            self.flag.cancel();
        }
        10
    }
}
