use clap::Parser;
use dripmint::config::{Cli, ConfigError, LedgerBackend, Settings};
use dripmint::distribution::{
    escalate_interrupts, AmountError, CancellationFlag, DistributionError, Distributor,
    UniformAmount,
};
use dripmint::recipients::{self, RecipientsError};
use dripmint::rpc::{HttpLedgerClient, LedgerClient, RpcError};
use dripmint::storage::{DeliveryLedger, JsonFileLedger, LedgerError, SledLedger};
use dripmint::telemetry;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Conventional status for termination by SIGINT
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Recipients(#[from] RecipientsError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("Failed to encode report: {0}")]
    ReportJson(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "dripmint failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let settings = cli.into_settings()?;
    let recipients = recipients::load(&settings.recipients)?;
    info!(
        count = recipients.len(),
        path = %settings.recipients.display(),
        "Recipients loaded"
    );

    let mut distributor = build_distributor(&settings)?;

    tokio::spawn(watch_interrupts(distributor.cancellation()));

    let report = distributor.run(&recipients).await;
    println!("{}", report);

    if let Some(path) = &settings.report {
        std::fs::write(path, serde_json::to_vec_pretty(&report)?)?;
        info!(path = %path.display(), "Report written");
    }

    Ok(if report.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// First interrupt stops the run after the current recipient; a second one exits at once
async fn watch_interrupts(cancel: CancellationFlag) {
    let exit_now =
        escalate_interrupts(&cancel, || async { tokio::signal::ctrl_c().await.is_ok() }).await;
    if exit_now {
        std::process::exit(EXIT_INTERRUPTED);
    }
}

fn build_distributor(settings: &Settings) -> Result<Distributor, CliError> {
    let client: Arc<dyn LedgerClient> =
        Arc::new(HttpLedgerClient::new(&settings.rpc_url, settings.http.clone())?);

    let dry_run = settings.distributor.dry_run;
    let ledger: Box<dyn DeliveryLedger> = match settings.ledger_backend {
        LedgerBackend::Json => Box::new(JsonFileLedger::new(&settings.ledger)),
        LedgerBackend::Sled if dry_run && !settings.ledger.exists() => {
            info!(path = %settings.ledger.display(), "No sled ledger yet, dry run uses an empty one");
            Box::new(SledLedger::temporary()?)
        }
        LedgerBackend::Sled => Box::new(SledLedger::open(&settings.ledger)?),
    };

    let config = settings.distributor.clone();
    let (min, max) = (config.min_amount, config.max_amount);
    let mut distributor = Distributor::new(config, client, ledger, settings.keypair.clone())?;

    if let Some(seed) = settings.amount_seed {
        distributor = distributor.with_amount_policy(Box::new(UniformAmount::seeded(min, max, seed)?));
    }
    Ok(distributor)
}
