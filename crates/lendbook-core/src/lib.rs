//! # Lendbook Core
//!
//! Core domain types for the Lendbook micro-loan payment lifecycle engine.
//!
//! This crate provides the building blocks shared by the storage layer and
//! the lifecycle engine:
//!
//! - **Types**: `Loan`, `Installment`, `PaymentTransaction`, `Borrower`,
//!   collateral items, statuses and repayment strategies
//! - **Dates**: a `Date` newtype with calendar-month arithmetic
//! - **Money**: two-decimal rounding helpers over `rust_decimal::Decimal`
//! - **Errors**: the `LedgerError` taxonomy returned by every operation
//!
//! ## Example
//!
//! ```rust
//! use lendbook_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let start = Date::from_ymd(2025, 1, 31).unwrap();
//! assert_eq!(start.add_months(1).unwrap(), Date::from_ymd(2025, 2, 28).unwrap());
//! assert_eq!(round_money(dec!(1000.005)), dec!(1000.01));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_wrap)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{LedgerError, LedgerResult};
    pub use crate::types::{
        round_money, Borrower, BorrowerId, CollateralItem, CollateralKind, Date, Installment,
        InstallmentId, InstallmentStatus, Loan, LoanId, LoanStatus, NewBorrower, NewLoan,
        PaymentTransaction, RepaymentStrategy, TransactionId,
    };
}

// Re-export commonly used types at crate root
pub use error::{LedgerError, LedgerResult};
pub use types::{Date, Installment, Loan, PaymentTransaction, RepaymentStrategy};
