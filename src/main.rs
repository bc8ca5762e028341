use clap::{Args, Parser, Subcommand};
use gvault::application::session::ResolutionSession;
use gvault::application::transfer::{TransferEngine, TransferInstruction};
use gvault::config::{ApiToken, DEFAULT_BASE_URL, LookupConfig};
use gvault::domain::bank::BankDirectory;
use gvault::domain::ports::LookupClientRef;
use gvault::domain::wallet::{Amount, Balance, Pin, TransferCategory, Wallet};
use gvault::error::VaultError;
use gvault::infrastructure::paystack::PaystackLookupClient;
use gvault::interfaces::csv::bank_reader::BankReader;
use gvault::interfaces::csv::bank_writer::BankWriter;
use gvault::interfaces::csv::fixture_reader::read_fixtures;
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the bank directory as CSV
    Banks {
        /// Case-insensitive filter on the bank name
        #[arg(long)]
        search: Option<String>,

        /// CSV file replacing the built-in directory
        #[arg(long)]
        directory: Option<PathBuf>,
    },
    /// Resolve a 10-digit account number to the holder's name
    Resolve {
        account_number: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },
    /// Resolve a recipient, then send money from the demo wallet
    Transfer {
        account_number: String,

        #[arg(long)]
        amount: Decimal,

        /// PIN entered by the user
        #[arg(long)]
        pin: String,

        #[arg(long)]
        note: Option<String>,

        #[arg(long, value_enum, default_value_t = TransferCategory::Personal)]
        category: TransferCategory,

        /// Opening wallet balance (defaults to the demo balance)
        #[arg(long)]
        balance: Option<Decimal>,

        /// PIN the wallet is locked with
        #[arg(long, env = "GVAULT_WALLET_PIN", hide_env_values = true)]
        wallet_pin: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },
}

#[derive(Args)]
struct LookupArgs {
    /// Id of the recipient's bank; omit to auto-detect
    #[arg(long)]
    bank: Option<String>,

    /// CSV file replacing the built-in directory
    #[arg(long)]
    directory: Option<PathBuf>,

    /// CSV of canned lookup answers; skips the network entirely
    #[arg(long)]
    fixtures: Option<PathBuf>,

    #[arg(long, env = "GVAULT_LOOKUP_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "GVAULT_LOOKUP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-lookup timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Timeout for a whole resolution run in seconds
    #[arg(long, default_value_t = 60)]
    run_timeout_secs: u64,
}

impl LookupArgs {
    fn config(&self) -> LookupConfig {
        LookupConfig {
            base_url: self.base_url.clone(),
            token: self.token.clone().map(ApiToken::new),
            request_timeout: Duration::from_secs(self.timeout_secs),
            run_timeout: Duration::from_secs(self.run_timeout_secs),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_directory(path: Option<&PathBuf>) -> Result<BankDirectory> {
    match path {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            BankReader::new(file).into_directory().into_diagnostic()
        }
        None => Ok(BankDirectory::builtin()),
    }
}

/// Runs the recipient form to completion: optional bank pick, then the account number.
async fn resolve_recipient(account_number: &str, lookup: &LookupArgs) -> Result<ResolutionSession> {
    let config = lookup.config();
    let directory = Arc::new(load_directory(lookup.directory.as_ref())?);

    let client: LookupClientRef = match &lookup.fixtures {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            Arc::new(read_fixtures(file).into_diagnostic()?)
        }
        None => Arc::new(PaystackLookupClient::new(&config).into_diagnostic()?),
    };

    let session =
        ResolutionSession::new(Arc::clone(&directory), client).with_run_timeout(config.run_timeout);

    if let Some(id) = &lookup.bank {
        let bank = directory
            .find(id)
            .cloned()
            .ok_or_else(|| VaultError::UnknownBank(id.clone()))
            .into_diagnostic()?;
        session.on_bank_manually_selected(bank).await;
    }
    session.on_account_number_changed(account_number).await;

    let view = session.view();
    if !view.can_proceed() {
        let message = view
            .message
            .unwrap_or_else(|| "Account number must be exactly 10 digits".to_string());
        return Err(miette!("{}", message));
    }
    Ok(session)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Banks { search, directory } => {
            let directory = load_directory(directory.as_ref())?;
            let banks = directory.filter(search.as_deref().unwrap_or(""));

            let stdout = io::stdout();
            let mut writer = BankWriter::new(stdout.lock());
            writer.write_banks(banks).into_diagnostic()?;
        }
        Command::Resolve {
            account_number,
            lookup,
        } => {
            let session = resolve_recipient(&account_number, &lookup).await?;
            let view = session.view();
            let bank = view
                .selected_bank
                .map(|bank| bank.display_name)
                .unwrap_or_default();
            println!("{},{}", view.resolved_name.unwrap_or_default(), bank);
        }
        Command::Transfer {
            account_number,
            amount,
            pin,
            note,
            category,
            balance,
            wallet_pin,
            lookup,
        } => {
            let wallet_pin = Pin::new(&wallet_pin).into_diagnostic()?;
            let wallet = match balance {
                Some(balance) => Wallet::new(Balance::new(balance), wallet_pin),
                None => Wallet::demo(wallet_pin),
            };
            let engine = TransferEngine::new(wallet);

            let session = resolve_recipient(&account_number, &lookup).await?;
            let instruction = TransferInstruction {
                amount: Amount::new(amount).into_diagnostic()?,
                note,
                category,
            };
            let receipt = engine
                .transfer(&session, instruction, &pin)
                .await
                .into_diagnostic()?;

            println!(
                "{}",
                serde_json::to_string_pretty(&receipt).into_diagnostic()?
            );
            eprintln!("{}", receipt.share_text());
        }
    }

    Ok(())
}
