// DistributionReport - What a run did, per recipient, and how it ended

use crate::identity::Address;
use crate::tx::TxHash;
use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Category of a fatal error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Delivery ledger read/write failure
    Io,
    /// Ledger client call failed
    Rpc,
    /// Nonce conflicts persisted past the retry limit
    SequenceConflict,
    /// Transaction could not be signed
    Signing,
    /// Sender cannot cover the mint/transfer or its gas
    InsufficientResource,
    /// Amount policy or unit conversion produced an unusable amount
    InvalidAmount,
    /// Distributor configuration rejected before the run
    InvalidConfig,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Io => "io",
            FailureKind::Rpc => "rpc",
            FailureKind::SequenceConflict => "sequence_conflict",
            FailureKind::Signing => "signing",
            FailureKind::InsufficientResource => "insufficient_resource",
            FailureKind::InvalidAmount => "invalid_amount",
            FailureKind::InvalidConfig => "invalid_config",
        };
        f.write_str(s)
    }
}

/// What happened to one recipient
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecipientOutcome {
    /// Already in the delivery ledger; nothing sent
    Skipped,
    /// Mined successfully and recorded
    Confirmed {
        amount: u64,
        #[serde(serialize_with = "decimal")]
        smallest_amount: U256,
        sequence: u64,
        tx_hash: TxHash,
        attempts: u32,
    },
    /// Built and signed only (dry run); nothing sent or recorded
    Simulated {
        amount: u64,
        #[serde(serialize_with = "decimal")]
        smallest_amount: U256,
        sequence: u64,
        tx_hash: TxHash,
    },
    /// Fatal error while servicing this recipient
    Failed { kind: FailureKind, reason: String },
}

/// Smallest-unit amounts can exceed what JSON numbers carry exactly
fn decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub recipient: Address,
    #[serde(flatten)]
    pub outcome: RecipientOutcome,
}

/// Why a run stopped early
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbortReason {
    /// Stop requested between recipients
    Cancelled,
    /// A fatal error; `recipient` is `None` when it happened before the first recipient
    Fatal {
        recipient: Option<Address>,
        kind: FailureKind,
        message: String,
    },
}

/// Overall result of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Aborted(AbortReason),
}

/// Per-recipient outcomes plus the run status
#[derive(Clone, Debug, Serialize)]
pub struct DistributionReport {
    entries: Vec<ReportEntry>,
    remaining: Vec<Address>,
    status: RunStatus,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl DistributionReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            entries: Vec::new(),
            remaining: Vec::new(),
            status: RunStatus::Completed,
            started_at,
            finished_at: started_at,
        }
    }

    pub(crate) fn push(&mut self, recipient: Address, outcome: RecipientOutcome) {
        self.entries.push(ReportEntry { recipient, outcome });
    }

    pub(crate) fn finish(mut self, status: RunStatus, remaining: Vec<Address>) -> Self {
        self.status = status;
        self.remaining = remaining;
        self.finished_at = Utc::now();
        self
    }

    /// Outcomes in processing order
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Recipients never attempted because the run stopped first
    pub fn remaining(&self) -> &[Address] {
        &self.remaining
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Outcome for `recipient`, if it was reached
    pub fn outcome_for(&self, recipient: &Address) -> Option<&RecipientOutcome> {
        self.entries
            .iter()
            .find(|e| &e.recipient == recipient)
            .map(|e| &e.outcome)
    }

    fn filter(&self, pred: impl Fn(&RecipientOutcome) -> bool) -> Vec<Address> {
        self.entries
            .iter()
            .filter(|e| pred(&e.outcome))
            .map(|e| e.recipient)
            .collect()
    }

    pub fn confirmed(&self) -> Vec<Address> {
        self.filter(|o| matches!(o, RecipientOutcome::Confirmed { .. }))
    }

    pub fn skipped(&self) -> Vec<Address> {
        self.filter(|o| matches!(o, RecipientOutcome::Skipped))
    }

    pub fn failed(&self) -> Vec<Address> {
        self.filter(|o| matches!(o, RecipientOutcome::Failed { .. }))
    }

    pub fn simulated(&self) -> Vec<Address> {
        self.filter(|o| matches!(o, RecipientOutcome::Simulated { .. }))
    }
}

impl fmt::Display for DistributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match &entry.outcome {
                RecipientOutcome::Skipped => {
                    writeln!(f, "  skipped    {}", entry.recipient)?;
                }
                RecipientOutcome::Confirmed {
                    amount,
                    sequence,
                    tx_hash,
                    ..
                } => {
                    writeln!(
                        f,
                        "  confirmed  {} amount={} nonce={} tx={}",
                        entry.recipient, amount, sequence, tx_hash
                    )?;
                }
                RecipientOutcome::Simulated {
                    amount, sequence, ..
                } => {
                    writeln!(
                        f,
                        "  dry-run    {} amount={} nonce={}",
                        entry.recipient, amount, sequence
                    )?;
                }
                RecipientOutcome::Failed { kind, reason } => {
                    writeln!(f, "  FAILED     {} [{}] {}", entry.recipient, kind, reason)?;
                }
            }
        }

        write!(
            f,
            "confirmed={} skipped={} failed={} not attempted={}: ",
            self.confirmed().len(),
            self.skipped().len(),
            self.failed().len(),
            self.remaining.len()
        )?;
        match &self.status {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Aborted(AbortReason::Cancelled) => write!(f, "aborted (cancelled)"),
            RunStatus::Aborted(AbortReason::Fatal {
                recipient,
                kind,
                message,
            }) => match recipient {
                Some(r) => write!(f, "aborted at {} [{}]: {}", r, kind, message),
                None => write!(f, "aborted before the first recipient [{}]: {}", kind, message),
            },
        }
    }
}
