//! Read models built on top of the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lendbook_core::types::{Borrower, Date, Installment, Loan};

use crate::config::ClassifierConfig;
use crate::defaulter::{assess_loan, BorrowerAssessment, LoanAssessment};

/// Days ahead counted as "due soon" on the dashboard.
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Collection position of a single loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    /// The loan itself.
    pub loan: Loan,
    /// Sum of scheduled amounts.
    pub total_scheduled: Decimal,
    /// Sum of paid amounts.
    pub total_paid: Decimal,
    /// Sum of outstanding balances.
    pub outstanding: Decimal,
    /// Number of installments.
    pub installments_total: usize,
    /// Number of fully collected installments.
    pub installments_collected: usize,
    /// Earliest installment that is not yet collected.
    pub next_due: Option<Installment>,
    /// Defaulter classification.
    pub assessment: LoanAssessment,
}

/// Summarizes a loan and its installments.
pub fn summarize_loan(
    loan: Loan,
    installments: &[Installment],
    today: Date,
    config: &ClassifierConfig,
) -> LoanSummary {
    let assessment = assess_loan(&loan, installments, today, config);
    let next_due = installments
        .iter()
        .filter(|i| !i.is_collected())
        .min_by_key(|i| i.due_date)
        .cloned();

    LoanSummary {
        total_scheduled: installments.iter().map(|i| i.amount).sum(),
        total_paid: installments.iter().map(|i| i.paid_amount).sum(),
        outstanding: installments.iter().map(|i| i.due_amount).sum(),
        installments_total: installments.len(),
        installments_collected: installments.iter().filter(|i| i.is_collected()).count(),
        next_due,
        assessment,
        loan,
    }
}

/// A borrower flagged by the classifier, for the defaulters report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaulterEntry {
    /// The borrower.
    pub borrower: Borrower,
    /// Their aggregated assessment.
    pub assessment: BorrowerAssessment,
}

/// Sorts defaulters with the most overdue borrower first.
pub fn sort_defaulters(entries: &mut [DefaulterEntry]) {
    entries.sort_by(|a, b| {
        b.assessment
            .max_days_overdue
            .cmp(&a.assessment.max_days_overdue)
            .then_with(|| a.borrower.name.cmp(&b.borrower.name))
    });
}

/// Portfolio-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Date the dashboard was computed for.
    pub as_of: Option<Date>,
    /// Number of borrowers.
    pub borrowers: usize,
    /// Loans in `active` status.
    pub active_loans: usize,
    /// Loans in `completed` status.
    pub completed_loans: usize,
    /// Sum of principal over all loans.
    pub total_principal: Decimal,
    /// Sum of every recorded transaction.
    pub total_collected: Decimal,
    /// Sum of outstanding balances.
    pub total_outstanding: Decimal,
    /// Uncollected installments due before today.
    pub overdue_installments: usize,
    /// Uncollected installments due within the next week.
    pub due_next_week: usize,
    /// Borrowers flagged as defaulters.
    pub defaulters: usize,
}

impl Dashboard {
    /// Folds one installment into the installment counters.
    pub fn observe_installment(&mut self, installment: &Installment, today: Date) {
        self.total_outstanding += installment.due_amount;
        if installment.is_overdue(today) {
            self.overdue_installments += 1;
        } else if !installment.is_collected() {
            let days = today.days_between(&installment.due_date);
            if (0..=DUE_SOON_WINDOW_DAYS).contains(&days) {
                self.due_next_week += 1;
            }
        }
    }
}
