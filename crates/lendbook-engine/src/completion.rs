//! Loan completion evaluator.

use tracing::info;

use lendbook_core::types::{Installment, Loan, LoanId, LoanStatus};
use lendbook_core::{LedgerError, LedgerResult};
use lendbook_storage::LedgerTxn;

use crate::schedule::StrategyRules;

/// Whether every installment is fully collected.
fn all_collected(installments: &[Installment]) -> bool {
    installments
        .iter()
        .all(|i| i.is_collected() && i.paid_amount >= i.amount)
}

/// True when an active, auto-completing loan has a non-empty, fully
/// collected schedule.
pub fn should_complete(loan: &Loan, installments: &[Installment]) -> bool {
    loan.status == LoanStatus::Active
        && loan.strategy.completes_automatically()
        && !installments.is_empty()
        && all_collected(installments)
}

/// True when a completed, auto-completing loan no longer has a fully
/// collected schedule (after a reset or a downward edit).
pub fn should_reopen(loan: &Loan, installments: &[Installment]) -> bool {
    loan.status == LoanStatus::Completed
        && loan.strategy.completes_automatically()
        && !all_collected(installments)
}

/// Marks the loan completed if [`should_complete`] holds.
///
/// Returns `true` when the status changed. Idempotent.
pub fn check_and_complete<T: LedgerTxn>(txn: &mut T, loan_id: &LoanId) -> LedgerResult<bool> {
    let mut loan = txn
        .get_loan(loan_id)?
        .ok_or_else(|| LedgerError::not_found("loan", loan_id))?;
    let installments = txn.installments_for_loan(loan_id)?;

    if !should_complete(&loan, &installments) {
        return Ok(false);
    }

    loan.status = LoanStatus::Completed;
    txn.put_loan(&loan)?;
    info!(loan_id = %loan.id, installments = installments.len(), "Loan completed");
    Ok(true)
}

/// Moves a completed loan back to active if [`should_reopen`] holds.
pub fn reopen_if_incomplete<T: LedgerTxn>(txn: &mut T, loan_id: &LoanId) -> LedgerResult<bool> {
    let mut loan = txn
        .get_loan(loan_id)?
        .ok_or_else(|| LedgerError::not_found("loan", loan_id))?;
    let installments = txn.installments_for_loan(loan_id)?;

    if !should_reopen(&loan, &installments) {
        return Ok(false);
    }

    loan.status = LoanStatus::Active;
    txn.put_loan(&loan)?;
    info!(loan_id = %loan.id, "Loan reopened");
    Ok(true)
}
