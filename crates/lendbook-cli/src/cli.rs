//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use lendbook_core::types::{Date, InstallmentId};

use crate::commands::{
    BorrowerArgs, CollectArgs, InstallmentArgs, LoanArgs, TxnArgs,
};

/// Lendbook - micro-loan collections ledger
#[derive(Parser)]
#[command(name = "lendbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "LENDBOOK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Database file; overrides `storage_path` from the configuration
    #[arg(long, env = "LENDBOOK_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Evaluate overdue and due-soon figures as of this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<Date>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Register, inspect and remove borrowers
    Borrower(BorrowerArgs),

    /// Create, inspect and remove loans
    Loan(LoanArgs),

    /// Manage a loan's installments
    Installment(InstallmentArgs),

    /// Record a collection against an installment
    Collect(CollectArgs),

    /// Undo every collection on an installment
    Reset {
        /// Installment ID
        installment: InstallmentId,
    },

    /// Inspect and correct payment transactions
    Txn(TxnArgs),

    /// List borrowers flagged as defaulters
    Defaulters,

    /// Portfolio overview
    Dashboard,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Minimal output (identifiers only)
    Minimal,
}
