//! Error types for the Lendbook ledger.
//!
//! Every lifecycle operation returns a [`LedgerResult`]. Failures are
//! synchronous and never retried inside the core.

use rust_decimal::Decimal;
use thiserror::Error;

/// A specialized Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// The main error type for ledger operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Referenced borrower, loan, installment or transaction does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record ("loan", "installment", ...).
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// Proposed cumulative paid amount would exceed the scheduled amount.
    #[error(
        "Amount cannot exceed EMI amount: scheduled {scheduled}, already paid {previously_paid}, attempted {attempted}"
    )]
    InvalidAmount {
        /// Scheduled amount of the installment.
        scheduled: Decimal,
        /// Amount paid before this attempt.
        previously_paid: Decimal,
        /// Amount the caller tried to add.
        attempted: Decimal,
    },

    /// Malformed input.
    #[error("Validation error: {reason}")]
    Validation {
        /// Description of what is wrong with the input.
        reason: String,
    },

    /// Persistence layer failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates an amount-cap violation.
    #[must_use]
    pub fn invalid_amount(scheduled: Decimal, previously_paid: Decimal, attempted: Decimal) -> Self {
        Self::InvalidAmount {
            scheduled,
            previously_paid,
            attempted,
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Returns true for [`LedgerError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
