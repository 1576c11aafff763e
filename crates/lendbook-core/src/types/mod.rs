//! Domain types for the ledger.

mod borrower;
mod date;
mod ids;
mod installment;
mod loan;
mod money;

pub use borrower::{Borrower, NewBorrower};
pub use date::Date;
pub use ids::{BorrowerId, InstallmentId, LoanId, TransactionId};
pub use installment::{Installment, InstallmentStatus, PaymentTransaction};
pub use loan::{
    CollateralItem, CollateralKind, Loan, LoanStatus, NewLoan, RepaymentStrategy,
};
pub use money::{outstanding, round_money, MONEY_DP};
