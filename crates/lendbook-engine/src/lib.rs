//! # Lendbook Engine
//!
//! The payment lifecycle engine for Lendbook micro-loans.
//!
//! This crate provides:
//! - [`generate_schedule`]: initial installments per repayment strategy
//! - [`apply_collection`]: the collection ledger (partial and full payments)
//! - [`apply_transaction_edit`]: edits to recorded transactions
//! - [`completion`]: the loan completion evaluator
//! - [`defaulter`]: streak-based defaulter classification
//! - [`LoanBook`]: the service that runs all of the above inside one storage
//!   unit of work per operation
//!
//! ## Architecture
//!
//! ```text
//! create_loan ──> schedule ──┐
//!                            │
//! collect ──> collection ────┼──> LedgerTxn ──> completion ──> commit
//! edit ─────> edit ──────────┤
//! reset ─────────────────────┘
//!
//! reports / defaulters <── defaulter::StreakCounter <── installments
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let config = LedgerConfig::from_file("lendbook.toml")?;
//! let storage = RedbStorage::open(&config.storage_path)?;
//! let book = LoanBook::new(storage).with_config(&config);
//!
//! book.collect_payment(&installment_id, CollectRequest::amount(dec!(500)))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book;
pub mod clock;
pub mod collection;
pub mod completion;
pub mod config;
pub mod defaulter;
pub mod edit;
pub mod reports;
pub mod schedule;

// Re-exports
pub use book::LoanBook;
pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{apply_collection, CollectRequest, CollectionOutcome};
pub use config::{ClassifierConfig, ConfigError, LedgerConfig, ScheduleConfig};
pub use defaulter::{
    assess_borrower, assess_loan, is_defaulted, BorrowerAssessment, LoanAssessment,
    StreakCounter,
};
pub use edit::{apply_transaction_edit, TransactionPatch};
pub use reports::{Dashboard, DefaulterEntry, LoanSummary};
pub use schedule::{generate_schedule, next_flat_installment, StrategyRules};
