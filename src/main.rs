use clap::{Parser, Subcommand};
use fanflow::application::orchestrator::{
    FanInRequest, FanOutRequest, SingleTransferRequest, TransferOrchestrator,
};
use fanflow::config::OrchestratorConfig;
use fanflow::domain::account::{AccountId, Credential, OwnerId};
use fanflow::infrastructure::in_memory::{InMemoryLedgerStore, SimulatedLedger};
use fanflow::interfaces::csv::account_reader::AccountReader;
use fanflow::interfaces::json::report_writer::ReportWriter;
use fanflow::logging::init_logging;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Accounts CSV file (owner, address, secret, balance)
    #[arg(long)]
    accounts: PathBuf,

    /// JSON configuration file. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of transfers in flight at once
    #[arg(long)]
    batch_size: Option<usize>,

    /// Pause between batches, in milliseconds
    #[arg(long)]
    rate_limit_ms: Option<u64>,

    /// Stagger between transfers of the same batch, in milliseconds
    #[arg(long)]
    per_item_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Distribute a share of one account across other accounts
    FanOut {
        #[arg(long)]
        owner: String,
        /// Address of the distributing account
        #[arg(long)]
        source: String,
        #[arg(long)]
        secret: String,
        /// Share of the source balance to distribute, in (0, 1]
        #[arg(long)]
        fraction: Decimal,
        /// Recipient address; repeatable. Defaults to all other accounts of the owner.
        #[arg(long = "to")]
        recipients: Vec<String>,
    },
    /// Sweep a share of many accounts into one
    FanIn {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        recipient: String,
        /// Share of each transferable balance to sweep, in (0, 1]
        #[arg(long)]
        fraction: Decimal,
        /// Source address; repeatable. Defaults to all other accounts of the owner.
        #[arg(long = "from")]
        sources: Vec<String>,
    },
    /// Send a fixed amount from one account
    Transfer {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        sender: String,
        #[arg(long)]
        secret: String,
        #[arg(long)]
        recipient: String,
        /// Amount in lamports
        #[arg(long)]
        amount: u64,
    },
    /// Sum the balances of every account of an owner
    Balance {
        #[arg(long)]
        owner: String,
    },
}

fn load_config(cli: &Cli) -> Result<OrchestratorConfig> {
    let mut config = match &cli.config {
        Some(path) => OrchestratorConfig::from_path(path).into_diagnostic()?,
        None => OrchestratorConfig::default(),
    };
    if let Some(batch_size) = cli.batch_size {
        config.scheduler.batch_size = batch_size;
    }
    if let Some(rate_limit_ms) = cli.rate_limit_ms {
        config.scheduler.rate_limit_ms = rate_limit_ms;
    }
    if let Some(per_item_delay_ms) = cli.per_item_delay_ms {
        config.scheduler.per_item_delay_ms = per_item_delay_ms;
    }
    config.validate().into_diagnostic()?;
    Ok(config)
}

fn non_empty(addresses: Vec<String>) -> Option<Vec<AccountId>> {
    if addresses.is_empty() {
        None
    } else {
        Some(addresses.into_iter().map(AccountId::new).collect())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.log_level);

    let store = InMemoryLedgerStore::new();
    let ledger = SimulatedLedger::new(config.fees.transaction_fee);

    let file = File::open(&cli.accounts).into_diagnostic()?;
    for record in AccountReader::new(file).records() {
        match record {
            Ok(record) => {
                let account = record.to_account();
                ledger
                    .open_account(account.credential.as_ref(), account.id.clone(), record.balance)
                    .await;
                store.insert(account).await;
            }
            Err(e) => warn!(error = %e, "Skipping unreadable account record"),
        }
    }

    let orchestrator = TransferOrchestrator::new(
        Arc::new(store),
        Arc::new(ledger.clone()),
        Arc::new(ledger),
        &config,
    )
    .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());

    match cli.command {
        Command::FanOut {
            owner,
            source,
            secret,
            fraction,
            recipients,
        } => {
            let summary = orchestrator
                .fan_out(FanOutRequest {
                    owner: OwnerId::new(owner),
                    source: Credential::new(AccountId::new(source), secret),
                    fraction,
                    recipients: non_empty(recipients),
                })
                .await
                .into_diagnostic()?;
            writer.write(&summary.to_report()).into_diagnostic()?;
        }
        Command::FanIn {
            owner,
            recipient,
            fraction,
            sources,
        } => {
            let summary = orchestrator
                .fan_in(FanInRequest {
                    owner: OwnerId::new(owner),
                    sources: non_empty(sources),
                    recipient: AccountId::new(recipient),
                    fraction,
                })
                .await
                .into_diagnostic()?;
            writer.write(&summary.to_report()).into_diagnostic()?;
        }
        Command::Transfer {
            owner,
            sender,
            secret,
            recipient,
            amount,
        } => {
            let receipt = orchestrator
                .transfer(SingleTransferRequest {
                    owner: OwnerId::new(owner),
                    sender: Credential::new(AccountId::new(sender), secret),
                    recipient: AccountId::new(recipient),
                    amount,
                })
                .await
                .into_diagnostic()?;
            writer
                .write(&serde_json::json!({ "receipt": receipt }))
                .into_diagnostic()?;
        }
        Command::Balance { owner } => {
            let balance = orchestrator
                .cumulative_balance(&OwnerId::new(owner))
                .await
                .into_diagnostic()?;
            writer.write(&balance).into_diagnostic()?;
        }
    }

    Ok(())
}
