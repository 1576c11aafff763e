//! Lendbook CLI - operator interface to the micro-loan ledger.
//!
//! # Usage
//!
//! ```bash
//! # Register a borrower and give them a 12-month EMI loan
//! lendbook borrower add --name "Asha Kumari" --phone 9845012345
//! lendbook loan create --borrower <ID> --principal 12000 --strategy emi --tenure 12
//!
//! # Record a partial payment, then settle the rest
//! lendbook collect <INSTALLMENT> --amount 400 --method cash
//! lendbook collect <INSTALLMENT> --full
//!
//! # Who is behind?
//! lendbook defaulters
//! lendbook dashboard --today 2025-06-30
//! ```

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendbook_engine::{FixedClock, LedgerConfig, LoanBook};
use lendbook_storage::{LedgerStore, RedbStorage};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::Context;
use error::CliError;

fn load_config(cli: &Cli) -> Result<LedgerConfig> {
    match &cli.config {
        Some(path) => {
            let path = path
                .to_str()
                .ok_or_else(|| CliError::Config(format!("non UTF-8 path {}", path.display())))?;
            Ok(LedgerConfig::from_file(path).with_context(|| format!("loading {path}"))?)
        }
        None => Ok(LedgerConfig::default()),
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.log_filter);

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.storage_path.clone().into());
    let storage = RedbStorage::open(&db_path)
        .with_context(|| format!("opening ledger {}", db_path.display()))?;
    debug!(path = %db_path.display(), backend = storage.backend_name(), "Ledger opened");

    let today = cli.today.unwrap_or_else(lendbook_core::Date::today);
    let ctx = Context {
        book: LoanBook::new(storage)
            .with_config(&config)
            .with_clock(FixedClock(today)),
        format: cli.format,
    };

    // Execute command
    match cli.command {
        Commands::Borrower(args) => commands::borrower::execute(args, &ctx)?,
        Commands::Loan(args) => commands::loan::execute(args, &ctx)?,
        Commands::Installment(args) => commands::installment::execute(args, &ctx)?,
        Commands::Collect(args) => commands::collect::execute(args, &ctx)?,
        Commands::Reset { installment } => commands::collect::reset(installment, &ctx)?,
        Commands::Txn(args) => commands::txn::execute(args, &ctx)?,
        Commands::Defaulters => commands::report::defaulters(&ctx)?,
        Commands::Dashboard => commands::report::dashboard(&ctx)?,
    }

    Ok(())
}
