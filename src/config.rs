// Configuration - Command line and environment
// Every node/secret setting can come from a flag or from the environment

use crate::distribution::{DistributionError, DistributorConfig};
use crate::identity::{parse_address, Address, Keypair, KeypairError};
use crate::rpc::HttpClientConfig;
use crate::tx::TokenCall;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

/// Errors turning command line input into runnable settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid private key: {0}")]
    InvalidKey(#[from] KeypairError),

    #[error("Sender address {configured} does not match the private key (derives {derived})")]
    SenderMismatch {
        configured: Address,
        derived: Address,
    },

    #[error("{0}")]
    Invalid(String),
}

impl From<DistributionError> for ConfigError {
    fn from(err: DistributionError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Where delivered recipients are persisted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LedgerBackend {
    /// JSON array of addresses, rewritten atomically on every record
    #[default]
    Json,
    /// sled database directory
    Sled,
}

/// Distribute tokens to a list of wallets, once each
#[derive(Parser, Debug)]
#[command(name = "dripmint", version, about)]
pub struct Cli {
    /// JSON-RPC endpoint of the node (http:// or https://)
    #[arg(long, env = "ETH_NODE_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Token contract address
    #[arg(long, env = "CONTRACT_ADDRESS", value_parser = parse_address)]
    pub contract: Address,

    /// Sending account; must match the private key when given
    #[arg(long, env = "SENDER_ADDRESS", value_parser = parse_address)]
    pub sender: Option<Address>,

    /// Hex secret key of the sending account
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Recipient list (JSON array or one address per line)
    #[arg(long, default_value = "wallets.json")]
    pub recipients: PathBuf,

    /// Delivery ledger location
    #[arg(long, default_value = "received_addresses.json")]
    pub ledger: PathBuf,

    #[arg(long, value_enum, default_value_t = LedgerBackend::Json)]
    pub ledger_backend: LedgerBackend,

    /// Token method to call: mint or transfer
    #[arg(long, default_value = "mint")]
    pub call: TokenCall,

    /// Smallest amount per recipient, in whole tokens
    #[arg(long, default_value_t = 1)]
    pub min_amount: u64,

    /// Largest amount per recipient, in whole tokens
    #[arg(long, default_value_t = 1000)]
    pub max_amount: u64,

    /// Seed for the amount picker (random when absent)
    #[arg(long)]
    pub amount_seed: Option<u64>,

    /// Retries per recipient after a nonce conflict
    #[arg(long, default_value_t = 1)]
    pub conflict_retries: u32,

    /// Seconds to wait before retrying a nonce conflict
    #[arg(long, default_value_t = 10)]
    pub retry_delay_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// How long to wait for a transaction to be mined, in seconds
    #[arg(long, default_value_t = 120)]
    pub receipt_timeout_secs: u64,

    /// Chain id to sign for (queried from the node when absent)
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Build and sign only; nothing is sent or recorded
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Validated settings the binary runs with
#[derive(Debug)]
pub struct Settings {
    pub rpc_url: String,
    pub http: HttpClientConfig,
    pub distributor: DistributorConfig,
    pub keypair: Keypair,
    pub recipients: PathBuf,
    pub ledger: PathBuf,
    pub ledger_backend: LedgerBackend,
    pub amount_seed: Option<u64>,
    pub report: Option<PathBuf>,
}

impl Cli {
    /// Parse the key, check the sender and validate the distributor config
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let keypair = Keypair::from_hex(self.private_key.trim())?;
        if let Some(configured) = self.sender {
            if configured != keypair.address() {
                return Err(ConfigError::SenderMismatch {
                    configured,
                    derived: keypair.address(),
                });
            }
        }

        let mut distributor = DistributorConfig::new(self.contract)
            .with_call(self.call)
            .with_amount_range(self.min_amount, self.max_amount)
            .with_max_conflict_retries(self.conflict_retries)
            .with_retry_delay_secs(self.retry_delay_secs)
            .with_dry_run(self.dry_run);
        if let Some(chain_id) = self.chain_id {
            distributor = distributor.with_chain_id(chain_id);
        }
        distributor.validate()?;

        if self.request_timeout_secs == 0 || self.receipt_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be > 0".to_string()));
        }
        let http = HttpClientConfig::new()
            .with_request_timeout_secs(self.request_timeout_secs)
            .with_receipt_timeout_secs(self.receipt_timeout_secs);

        Ok(Settings {
            rpc_url: self.rpc_url,
            http,
            distributor,
            keypair,
            recipients: self.recipients,
            ledger: self.ledger,
            ledger_backend: self.ledger_backend,
            amount_seed: self.amount_seed,
            report: self.report,
        })
    }
}
