//! CLI command implementations.

pub mod borrower;
pub mod collect;
pub mod installment;
pub mod loan;
pub mod report;
pub mod txn;

// Re-export submodules for convenience
pub use borrower::BorrowerArgs;
pub use collect::CollectArgs;
pub use installment::InstallmentArgs;
pub use loan::LoanArgs;
pub use txn::TxnArgs;

use lendbook_engine::{FixedClock, LoanBook};
use lendbook_storage::RedbStorage;

use crate::cli::OutputFormat;

/// The book every command operates on.
pub type Book = LoanBook<RedbStorage, FixedClock>;

/// Shared state handed to every command.
pub struct Context {
    /// Open ledger.
    pub book: Book,
    /// Requested output format.
    pub format: OutputFormat,
}
