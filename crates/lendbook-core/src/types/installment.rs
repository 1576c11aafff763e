//! Scheduled installments and the payment transactions recorded against them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::outstanding;
use super::{Date, InstallmentId, LoanId, TransactionId};
use crate::error::LedgerError;

/// Collection status of an installment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Nothing collected yet.
    #[default]
    Upcoming,
    /// Partially collected, balance still owing.
    DueSoon,
    /// Fully collected.
    Collected,
}

impl InstallmentStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::DueSoon => "due_soon",
            Self::Collected => "collected",
        }
    }

    /// Status implied by a paid total against a scheduled amount.
    pub fn from_totals(paid: Decimal, scheduled: Decimal) -> Self {
        if paid <= Decimal::ZERO {
            Self::Upcoming
        } else if paid < scheduled {
            Self::DueSoon
        } else {
            Self::Collected
        }
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallmentStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "due_soon" | "due-soon" => Ok(Self::DueSoon),
            "collected" => Ok(Self::Collected),
            other => Err(LedgerError::validation(format!(
                "unknown installment status: {other}"
            ))),
        }
    }
}

/// One scheduled payment on a loan.
///
/// Once anything has been collected, `paid_amount + due_amount == amount`
/// holds, except on flat loans where `paid_amount` may exceed `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// Installment identifier.
    pub id: InstallmentId,
    /// Owning loan.
    pub loan_id: LoanId,
    /// Due date.
    pub due_date: Date,
    /// Scheduled amount.
    pub amount: Decimal,
    /// Collection status.
    pub status: InstallmentStatus,
    /// Cumulative amount collected.
    pub paid_amount: Decimal,
    /// Outstanding balance.
    pub due_amount: Decimal,
    /// Date of the latest collection.
    pub paid_date: Option<Date>,
    /// Method of the latest collection.
    pub payment_method: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl Installment {
    /// Creates an untouched installment.
    pub fn scheduled(loan_id: LoanId, due_date: Date, amount: Decimal) -> Self {
        Self {
            id: InstallmentId::new(),
            loan_id,
            due_date,
            amount,
            status: InstallmentStatus::Upcoming,
            paid_amount: Decimal::ZERO,
            due_amount: amount,
            paid_date: None,
            payment_method: None,
            notes: None,
        }
    }

    /// Returns true once the installment is fully collected.
    pub fn is_collected(&self) -> bool {
        self.status == InstallmentStatus::Collected
    }

    /// Due strictly before `today` and not collected.
    pub fn is_overdue(&self, today: Date) -> bool {
        !self.is_collected() && self.due_date < today
    }

    /// Returns true if any money has been collected.
    pub fn has_payments(&self) -> bool {
        self.paid_amount > Decimal::ZERO
    }

    /// Applies a new paid total, deriving balance and status.
    pub fn apply_paid_total(&mut self, paid: Decimal) {
        self.paid_amount = paid;
        self.due_amount = outstanding(self.amount, paid);
        self.status = InstallmentStatus::from_totals(paid, self.amount);
    }

    /// Returns the installment to its pre-collection state.
    pub fn reset(&mut self) {
        self.paid_amount = Decimal::ZERO;
        self.due_amount = self.amount;
        self.status = InstallmentStatus::Upcoming;
        self.paid_date = None;
        self.payment_method = None;
        self.notes = None;
    }
}

/// One recorded collection event against an installment.
///
/// The log records deltas: the sum of an installment's transactions equals
/// its `paid_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Owning installment.
    pub installment_id: InstallmentId,
    /// Amount collected in this event.
    pub amount: Decimal,
    /// Date the money was received.
    pub paid_date: Date,
    /// Payment method ("cash", "upi", ...).
    pub payment_method: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl PaymentTransaction {
    /// Creates a new transaction record.
    pub fn record(
        installment_id: InstallmentId,
        amount: Decimal,
        paid_date: Date,
        payment_method: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            installment_id,
            amount,
            paid_date,
            payment_method,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn due() -> Date {
        Date::from_ymd(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_status_from_totals() {
        assert_eq!(
            InstallmentStatus::from_totals(dec!(0), dec!(1000)),
            InstallmentStatus::Upcoming
        );
        assert_eq!(
            InstallmentStatus::from_totals(dec!(400), dec!(1000)),
            InstallmentStatus::DueSoon
        );
        assert_eq!(
            InstallmentStatus::from_totals(dec!(1000), dec!(1000)),
            InstallmentStatus::Collected
        );
        assert_eq!(
            InstallmentStatus::from_totals(dec!(1200), dec!(1000)),
            InstallmentStatus::Collected
        );
    }

    #[test]
    fn test_overdue_is_date_only_and_strict() {
        let inst = Installment::scheduled(LoanId::new(), due(), dec!(500));
        assert!(!inst.is_overdue(due()));
        assert!(inst.is_overdue(due().add_days(1)));
        assert!(!inst.is_overdue(due().add_days(-1)));
    }

    #[test]
    fn test_reset_restores_pristine_fields() {
        let pristine = Installment::scheduled(LoanId::new(), due(), dec!(500));
        let mut inst = pristine.clone();
        inst.apply_paid_total(dec!(200));
        inst.paid_date = Some(due());
        inst.payment_method = Some("cash".into());
        inst.notes = Some("partial".into());
        assert_eq!(inst.status, InstallmentStatus::DueSoon);
        assert_eq!(inst.due_amount, dec!(300));

        inst.reset();
        assert_eq!(inst, pristine);
    }
}
