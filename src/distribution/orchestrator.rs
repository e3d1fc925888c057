// Distributor - The idempotent distribution engine
// Walks the recipient list once, one transaction in flight, recording each confirmed delivery

use super::{
    to_smallest_unit, AbortReason, AmountError, AmountPolicy, CancellationFlag,
    DistributionReport, FailureKind, RecipientOutcome, RunStatus, SequenceTracker, UniformAmount,
};
use crate::identity::{Address, Keypair, Signer, SigningError};
use crate::rpc::{CallRequest, LedgerClient, RpcError, SubmitError};
use crate::storage::{DeliveryLedger, LedgerError};
use crate::tx::{TokenCall, TransactionBuilder, TxHash};
use alloy_primitives::U256;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

// ============================================================================
// DISTRIBUTOR CONFIG
// ============================================================================

/// Configuration for a distribution run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Token contract that receives the calls
    pub asset: Address,
    /// Which token method to call
    pub call: TokenCall,
    /// Smallest amount (display units) the default policy picks
    pub min_amount: u64,
    /// Largest amount (display units) the default policy picks
    pub max_amount: u64,
    /// Retries allowed per recipient after a nonce conflict
    pub max_conflict_retries: u32,
    /// Delay before each conflict retry, in seconds
    pub retry_delay_secs: u64,
    /// Chain id to sign for; queried from the node when `None`
    pub chain_id: Option<u64>,
    /// Build and sign without submitting or recording
    pub dry_run: bool,
}

impl DistributorConfig {
    /// Create a config for the given token contract
    pub fn new(asset: Address) -> Self {
        Self {
            asset,
            call: TokenCall::Mint,
            min_amount: 1,
            max_amount: 1000,
            max_conflict_retries: 1,
            retry_delay_secs: 10,
            chain_id: None,
            dry_run: false,
        }
    }

    pub fn with_call(mut self, call: TokenCall) -> Self {
        self.call = call;
        self
    }

    /// Set the inclusive amount range of the default policy
    pub fn with_amount_range(mut self, min: u64, max: u64) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn with_retry_delay_secs(mut self, secs: u64) -> Self {
        self.retry_delay_secs = secs;
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DistributionError> {
        if self.asset.is_zero() {
            return Err(DistributionError::InvalidConfig(
                "asset contract must not be the zero address".to_string(),
            ));
        }
        if self.min_amount == 0 {
            return Err(DistributionError::InvalidConfig(
                "min_amount must be > 0".to_string(),
            ));
        }
        if self.min_amount > self.max_amount {
            return Err(DistributionError::InvalidConfig(format!(
                "min_amount {} exceeds max_amount {}",
                self.min_amount, self.max_amount
            )));
        }
        if self.chain_id == Some(0) {
            return Err(DistributionError::InvalidConfig(
                "chain_id must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// DISTRIBUTION ERROR
// ============================================================================

/// Errors that stop a distribution run
#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("Delivery ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Ledger client error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Sequence conflict persisted after {attempts} attempts: {message}")]
    SequenceConflict { attempts: u32, message: String },

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Insufficient resources: {0}")]
    InsufficientResource(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DistributionError {
    /// Category used in the report
    pub fn kind(&self) -> FailureKind {
        match self {
            DistributionError::Ledger(_) => FailureKind::Io,
            DistributionError::Rpc(_) => FailureKind::Rpc,
            DistributionError::SequenceConflict { .. } => FailureKind::SequenceConflict,
            DistributionError::Signing(_) => FailureKind::Signing,
            DistributionError::InsufficientResource(_) => FailureKind::InsufficientResource,
            DistributionError::InvalidAmount(_) => FailureKind::InvalidAmount,
            DistributionError::InvalidConfig(_) => FailureKind::InvalidConfig,
        }
    }

    fn from_estimate(err: RpcError) -> Self {
        if err.is_insufficient_funds() {
            DistributionError::InsufficientResource(err.to_string())
        } else {
            DistributionError::Rpc(err)
        }
    }
}

// ============================================================================
// DISTRIBUTOR EVENTS
// ============================================================================

/// Events emitted by the distributor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DistributorEvent {
    /// Recipient already in the delivery ledger
    RecipientSkipped { recipient: Address },
    /// The node rejected the nonce; `will_retry` is false once retries are spent
    SequenceConflict {
        recipient: Address,
        sequence: u64,
        attempt: u32,
        will_retry: bool,
    },
    /// Transaction mined and delivery recorded
    SubmissionConfirmed {
        recipient: Address,
        sequence: u64,
        tx_hash: TxHash,
        attempts: u32,
    },
    /// Run stopped before the end of the list
    RunAborted {
        recipient: Option<Address>,
        reason: AbortReason,
    },
    /// Every recipient handled
    RunCompleted { confirmed: usize, skipped: usize },
}

// ============================================================================
// DISTRIBUTOR STATS
// ============================================================================

/// Statistics about distributor operations
#[derive(Clone, Debug, Default)]
pub struct DistributorStats {
    pub runs: u64,
    pub submissions: u64,
    pub confirmed: u64,
    pub skipped: u64,
    pub sequence_conflicts: u64,
    pub total_amount: U256,
}

// ============================================================================
// DISTRIBUTOR
// ============================================================================

/// What a successful (or simulated) delivery produced
struct Delivery {
    amount: u64,
    smallest_amount: U256,
    sequence: u64,
    tx_hash: TxHash,
    attempts: u32,
}

/// Per-run state fetched from the node at startup
struct RunContext {
    tracker: SequenceTracker,
    builder: TransactionBuilder,
    decimals: u8,
}

/// The distribution engine.
///
/// Owns every capability it uses: the ledger client, the delivery ledger,
/// the sender keypair and the amount policy. `run` takes `&mut self`, so one
/// distributor never has two submissions in flight.
pub struct Distributor {
    config: DistributorConfig,
    client: Arc<dyn LedgerClient>,
    ledger: Box<dyn DeliveryLedger>,
    keypair: Keypair,
    amounts: Box<dyn AmountPolicy>,
    cancel: CancellationFlag,
    events: Vec<DistributorEvent>,
    stats: DistributorStats,
}

impl Distributor {
    /// Create a distributor using the uniform amount policy from `config`
    pub fn new(
        config: DistributorConfig,
        client: Arc<dyn LedgerClient>,
        ledger: Box<dyn DeliveryLedger>,
        keypair: Keypair,
    ) -> Result<Self, DistributionError> {
        config.validate()?;
        let amounts = UniformAmount::new(config.min_amount, config.max_amount)?;

        Ok(Self {
            config,
            client,
            ledger,
            keypair,
            amounts: Box::new(amounts),
            cancel: CancellationFlag::new(),
            events: Vec::new(),
            stats: DistributorStats::default(),
        })
    }

    /// Replace the amount policy
    pub fn with_amount_policy(mut self, policy: Box<dyn AmountPolicy>) -> Self {
        self.amounts = policy;
        self
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle for stopping the run between recipients
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    /// The sending account
    pub fn sender(&self) -> Address {
        self.keypair.address()
    }

    /// Recipients recorded in the delivery ledger
    pub fn delivered(&self) -> Vec<Address> {
        self.ledger.delivered()
    }

    /// Poll for events (clears the event queue)
    pub fn poll_events(&mut self) -> Vec<DistributorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get statistics
    pub fn stats(&self) -> &DistributorStats {
        &self.stats
    }

    /// Service `recipients` in order.
    ///
    /// Never returns early with an error: every failure is reported in the
    /// returned report, together with the recipient that was in flight and the
    /// recipients that were never attempted.
    pub async fn run(&mut self, recipients: &[Address]) -> DistributionReport {
        let report = DistributionReport::new(Utc::now());
        self.stats.runs += 1;

        info!(
            sender = %self.keypair.address(),
            asset = %self.config.asset,
            recipients = recipients.len(),
            dry_run = self.config.dry_run,
            "Starting distribution"
        );

        let mut ctx = match self.prepare().await {
            Ok(ctx) => ctx,
            Err(err) => {
                error!(error = %err, "Distribution could not start");
                return self.abort(report, None, err, recipients.to_vec());
            }
        };

        self.process(&mut ctx, recipients, report).await
    }

    async fn prepare(&mut self) -> Result<RunContext, DistributionError> {
        let already = if self.config.dry_run {
            self.ledger.load_existing()?
        } else {
            self.ledger.load()?
        };
        info!(delivered = already.len(), "Delivery ledger loaded");

        let decimals = self.client.asset_decimals(&self.config.asset).await?;
        let chain_id = match self.config.chain_id {
            Some(id) => id,
            None => self.client.chain_id().await?,
        };
        let tracker = SequenceTracker::start(self.client.clone(), self.keypair.address()).await?;

        info!(decimals, chain_id, nonce = tracker.current(), "Node state fetched");

        let builder = TransactionBuilder::new(self.config.asset, chain_id).with_call(self.config.call);
        Ok(RunContext {
            tracker,
            builder,
            decimals,
        })
    }

    async fn process(
        &mut self,
        ctx: &mut RunContext,
        recipients: &[Address],
        mut report: DistributionReport,
    ) -> DistributionReport {
        for (index, recipient) in recipients.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(next = %recipient, "Cancellation requested, stopping");
                let reason = AbortReason::Cancelled;
                self.events.push(DistributorEvent::RunAborted {
                    recipient: None,
                    reason: reason.clone(),
                });
                return report.finish(RunStatus::Aborted(reason), recipients[index..].to_vec());
            }

            if self.ledger.has(recipient) {
                info!(recipient = %recipient, "Skipping, already received tokens");
                self.stats.skipped += 1;
                self.events
                    .push(DistributorEvent::RecipientSkipped { recipient: *recipient });
                report.push(*recipient, RecipientOutcome::Skipped);
                continue;
            }

            let delivery = match self.deliver(ctx, recipient).await {
                Ok(delivery) => delivery,
                Err(err) => {
                    return self.abort(report, Some(*recipient), err, recipients[index + 1..].to_vec())
                }
            };

            if self.config.dry_run {
                report.push(
                    *recipient,
                    RecipientOutcome::Simulated {
                        amount: delivery.amount,
                        smallest_amount: delivery.smallest_amount,
                        sequence: delivery.sequence,
                        tx_hash: delivery.tx_hash,
                    },
                );
                continue;
            }

            if let Err(err) = self.ledger.record(recipient) {
                error!(
                    recipient = %recipient,
                    tx = %delivery.tx_hash,
                    error = %err,
                    "Transaction confirmed but the delivery record failed; a rerun will send again"
                );
                return self.abort(
                    report,
                    Some(*recipient),
                    DistributionError::Ledger(err),
                    recipients[index + 1..].to_vec(),
                );
            }

            info!(
                recipient = %recipient,
                amount = delivery.amount,
                nonce = delivery.sequence,
                tx = %delivery.tx_hash,
                "Tokens delivered"
            );
            self.stats.confirmed += 1;
            self.stats.total_amount = self
                .stats
                .total_amount
                .saturating_add(delivery.smallest_amount);
            self.events.push(DistributorEvent::SubmissionConfirmed {
                recipient: *recipient,
                sequence: delivery.sequence,
                tx_hash: delivery.tx_hash,
                attempts: delivery.attempts,
            });
            report.push(
                *recipient,
                RecipientOutcome::Confirmed {
                    amount: delivery.amount,
                    smallest_amount: delivery.smallest_amount,
                    sequence: delivery.sequence,
                    tx_hash: delivery.tx_hash,
                    attempts: delivery.attempts,
                },
            );
        }

        let confirmed = report.confirmed().len();
        let skipped = report.skipped().len();
        info!(confirmed, skipped, "Distribution completed");
        self.events
            .push(DistributorEvent::RunCompleted { confirmed, skipped });
        report.finish(RunStatus::Completed, Vec::new())
    }

    /// Build, sign and submit for one recipient, retrying nonce conflicts
    async fn deliver(
        &mut self,
        ctx: &mut RunContext,
        recipient: &Address,
    ) -> Result<Delivery, DistributionError> {
        let amount = self.amounts.select(recipient);
        let smallest_amount = to_smallest_unit(amount, ctx.decimals)?;
        let data = ctx.builder.call_data(recipient, smallest_amount);
        let call = CallRequest {
            from: self.keypair.address(),
            to: self.config.asset,
            data,
        };

        let mut attempts = 0u32;
        loop {
            attempts += 1;

            let gas_limit = self
                .client
                .estimate_gas(&call)
                .await
                .map_err(DistributionError::from_estimate)?;
            let gas_price = self.client.gas_price().await?;
            let sequence = ctx.tracker.current();

            let unsigned =
                ctx.builder
                    .build(recipient, smallest_amount, sequence, gas_limit, gas_price);
            let signed = Signer::sign(&unsigned, &self.keypair)?;
            debug!(
                recipient = %recipient,
                nonce = sequence,
                gas_limit,
                gas_price,
                attempt = attempts,
                "Transaction signed"
            );

            if self.config.dry_run {
                ctx.tracker.advance();
                return Ok(Delivery {
                    amount,
                    smallest_amount,
                    sequence,
                    tx_hash: signed.hash(),
                    attempts,
                });
            }

            self.stats.submissions += 1;
            let message = match self.client.submit(&signed).await {
                Ok(receipt) => {
                    ctx.tracker.advance();
                    return Ok(Delivery {
                        amount,
                        smallest_amount,
                        sequence,
                        tx_hash: receipt.hash,
                        attempts,
                    });
                }
                Err(SubmitError::SequenceConflict(message)) => message,
                Err(SubmitError::InsufficientFunds(message)) => {
                    return Err(DistributionError::InsufficientResource(message))
                }
                Err(SubmitError::Rpc(err)) => return Err(err.into()),
            };

            self.stats.sequence_conflicts += 1;
            let will_retry = attempts <= self.config.max_conflict_retries;
            self.events.push(DistributorEvent::SequenceConflict {
                recipient: *recipient,
                sequence,
                attempt: attempts,
                will_retry,
            });
            if !will_retry {
                return Err(DistributionError::SequenceConflict { attempts, message });
            }

            warn!(
                recipient = %recipient,
                nonce = sequence,
                attempt = attempts,
                delay_secs = self.config.retry_delay_secs,
                reason = %message,
                "Nonce conflict, retrying"
            );
            if self.config.retry_delay_secs > 0 {
                tokio::time::sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
            }
            ctx.tracker.refresh().await?;
        }
    }

    fn abort(
        &mut self,
        mut report: DistributionReport,
        recipient: Option<Address>,
        err: DistributionError,
        remaining: Vec<Address>,
    ) -> DistributionReport {
        let kind = err.kind();
        let message = err.to_string();

        if let Some(r) = recipient {
            error!(recipient = %r, kind = %kind, error = %message, "Distribution aborted");
            report.push(
                r,
                RecipientOutcome::Failed {
                    kind,
                    reason: message.clone(),
                },
            );
        }

        let reason = AbortReason::Fatal {
            recipient,
            kind,
            message,
        };
        self.events.push(DistributorEvent::RunAborted {
            recipient,
            reason: reason.clone(),
        });
        report.finish(RunStatus::Aborted(reason), remaining)
    }
}
