//! Collection ledger.
//!
//! Applies one collection request to an installment. Pure: the caller loads
//! the installment, calls [`apply_collection`] and persists the outcome in a
//! single unit of work.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lendbook_core::types::{
    round_money, Date, Installment, InstallmentStatus, PaymentTransaction, RepaymentStrategy,
};
use lendbook_core::{LedgerError, LedgerResult};

/// A request to record money against an installment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectRequest {
    /// Amount received now (a delta, not a running total).
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Payment method ("cash", "upi", ...).
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Date the money was received; defaults to today.
    #[serde(default)]
    pub paid_date: Option<Date>,
    /// Notes for the installment and the transaction.
    #[serde(default)]
    pub notes: Option<String>,
    /// `collected` without an amount collects everything still due.
    #[serde(default)]
    pub status: Option<InstallmentStatus>,
}

impl CollectRequest {
    /// Collect a specific amount.
    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Collect whatever is still due.
    pub fn full() -> Self {
        Self {
            status: Some(InstallmentStatus::Collected),
            ..Self::default()
        }
    }

    /// Only update notes.
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    /// Sets the payment method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    /// Sets the paid date.
    pub fn with_paid_date(mut self, date: Date) -> Self {
        self.paid_date = Some(date);
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn is_notes_only(&self) -> bool {
        self.notes.is_some()
            && self.amount.is_none()
            && self.status.is_none()
            && self.paid_date.is_none()
            && self.payment_method.is_none()
    }
}

/// What a collection did to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionOutcome {
    /// Only the installment notes changed.
    NotesUpdated,
    /// Money was recorded; the transaction must be appended to the log.
    Recorded(PaymentTransaction),
}

impl CollectionOutcome {
    /// The transaction to append, if any.
    pub fn transaction(&self) -> Option<&PaymentTransaction> {
        match self {
            Self::Recorded(txn) => Some(txn),
            Self::NotesUpdated => None,
        }
    }
}

/// Applies `request` to `installment` in place.
///
/// Amounts are deltas. Every strategy except `flat` rejects a delta that
/// would take the paid total past the scheduled amount.
pub fn apply_collection(
    strategy: RepaymentStrategy,
    installment: &mut Installment,
    request: CollectRequest,
    today: Date,
) -> LedgerResult<CollectionOutcome> {
    if request.is_notes_only() && installment.has_payments() {
        installment.notes = request.notes;
        return Ok(CollectionOutcome::NotesUpdated);
    }

    let delta = match request.amount {
        Some(amount) => {
            let amount = round_money(amount);
            if amount <= Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "collection amount must be positive, got {amount}"
                )));
            }
            let total = installment.paid_amount + amount;
            if strategy.caps_collection() && total > installment.amount {
                return Err(LedgerError::invalid_amount(
                    installment.amount,
                    installment.paid_amount,
                    amount,
                ));
            }
            amount
        }
        None if request.status == Some(InstallmentStatus::Collected) => {
            if installment.is_collected() {
                return Err(LedgerError::validation(format!(
                    "installment {} is already collected",
                    installment.id
                )));
            }
            if installment.has_payments() {
                installment.due_amount
            } else {
                installment.amount
            }
        }
        None if request.notes.is_some() => {
            installment.notes = request.notes;
            return Ok(CollectionOutcome::NotesUpdated);
        }
        None => {
            return Err(LedgerError::validation(
                "nothing to collect: supply an amount, status=collected or notes",
            ));
        }
    };

    let paid_date = request.paid_date.unwrap_or(today);
    installment.apply_paid_total(installment.paid_amount + delta);
    installment.paid_date = Some(paid_date);
    if request.payment_method.is_some() {
        installment.payment_method = request.payment_method.clone();
    }
    if request.notes.is_some() {
        installment.notes = request.notes.clone();
    }

    Ok(CollectionOutcome::Recorded(PaymentTransaction::record(
        installment.id,
        delta,
        paid_date,
        request.payment_method,
        request.notes,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbook_core::types::LoanId;
    use rust_decimal_macros::dec;

    fn today() -> Date {
        Date::from_ymd(2025, 3, 10).unwrap()
    }

    fn installment(amount: Decimal) -> Installment {
        Installment::scheduled(LoanId::new(), Date::from_ymd(2025, 3, 15).unwrap(), amount)
    }

    #[test]
    fn test_partial_then_full() {
        let mut inst = installment(dec!(1000));

        let first = apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(400)).with_method("cash"),
            today(),
        )
        .unwrap();
        assert_eq!(first.transaction().map(|t| t.amount), Some(dec!(400)));
        assert_eq!(inst.paid_amount, dec!(400));
        assert_eq!(inst.due_amount, dec!(600));
        assert_eq!(inst.status, InstallmentStatus::DueSoon);
        assert_eq!(inst.paid_date, Some(today()));
        assert_eq!(inst.payment_method.as_deref(), Some("cash"));

        let second = apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(600)),
            today(),
        )
        .unwrap();
        assert_eq!(second.transaction().map(|t| t.amount), Some(dec!(600)));
        assert_eq!(inst.paid_amount, dec!(1000));
        assert_eq!(inst.due_amount, Decimal::ZERO);
        assert_eq!(inst.status, InstallmentStatus::Collected);
    }

    #[test]
    fn test_cap_rejects_overpayment_without_mutation() {
        let mut inst = installment(dec!(1000));
        apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(800)),
            today(),
        )
        .unwrap();
        let before = inst.clone();

        let err = apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(300)),
            today(),
        )
        .unwrap_err();

        assert_eq!(err, LedgerError::invalid_amount(dec!(1000), dec!(800), dec!(300)));
        assert_eq!(inst, before);
    }

    #[test]
    fn test_flat_exempt_from_cap() {
        let mut inst = installment(dec!(1000));
        let outcome = apply_collection(
            RepaymentStrategy::Flat,
            &mut inst,
            CollectRequest::amount(dec!(1200)),
            today(),
        )
        .unwrap();

        assert_eq!(outcome.transaction().map(|t| t.amount), Some(dec!(1200)));
        assert_eq!(inst.paid_amount, dec!(1200));
        assert_eq!(inst.due_amount, Decimal::ZERO);
        assert_eq!(inst.status, InstallmentStatus::Collected);
    }

    #[test]
    fn test_full_collection_without_amount() {
        let mut inst = installment(dec!(1000));
        let paid_on = Date::from_ymd(2025, 3, 1).unwrap();
        let outcome = apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::full().with_paid_date(paid_on),
            today(),
        )
        .unwrap();

        let txn = outcome.transaction().unwrap();
        assert_eq!(txn.amount, dec!(1000));
        assert_eq!(txn.paid_date, paid_on);
        assert_eq!(inst.status, InstallmentStatus::Collected);
        assert_eq!(inst.paid_date, Some(paid_on));
    }

    #[test]
    fn test_full_collection_after_partial_takes_balance() {
        let mut inst = installment(dec!(1000));
        apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(250)),
            today(),
        )
        .unwrap();

        let outcome =
            apply_collection(RepaymentStrategy::Emi, &mut inst, CollectRequest::full(), today())
                .unwrap();
        assert_eq!(outcome.transaction().map(|t| t.amount), Some(dec!(750)));
        assert_eq!(inst.paid_amount, dec!(1000));
    }

    #[test]
    fn test_full_collection_with_notes_after_partial() {
        let mut inst = installment(dec!(1000));
        apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(400)),
            today(),
        )
        .unwrap();

        let outcome = apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::full().with_notes("settled"),
            today(),
        )
        .unwrap();

        let record = outcome.transaction().unwrap();
        assert_eq!(record.amount, dec!(600));
        assert_eq!(record.notes.as_deref(), Some("settled"));
        assert_eq!(inst.status, InstallmentStatus::Collected);
        assert_eq!(inst.paid_amount, dec!(1000));
        assert_eq!(inst.due_amount, Decimal::ZERO);
        assert_eq!(inst.notes.as_deref(), Some("settled"));
    }

    #[test]
    fn test_full_collection_on_collected_fails() {
        let mut inst = installment(dec!(1000));
        apply_collection(RepaymentStrategy::Emi, &mut inst, CollectRequest::full(), today())
            .unwrap();
        let err =
            apply_collection(RepaymentStrategy::Emi, &mut inst, CollectRequest::full(), today())
                .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
    }

    #[test]
    fn test_notes_only_on_paid_installment() {
        let mut inst = installment(dec!(1000));
        apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(300)),
            today(),
        )
        .unwrap();
        let before = inst.clone();

        let outcome = apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::notes("promised rest next week"),
            today(),
        )
        .unwrap();

        assert_eq!(outcome, CollectionOutcome::NotesUpdated);
        assert_eq!(inst.notes.as_deref(), Some("promised rest next week"));
        assert_eq!(inst.paid_amount, before.paid_amount);
        assert_eq!(inst.status, before.status);
        assert_eq!(inst.paid_date, before.paid_date);
    }

    #[test]
    fn test_notes_only_on_unpaid_installment() {
        let mut inst = installment(dec!(1000));
        let outcome = apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::notes("called, no answer"),
            today(),
        )
        .unwrap();

        assert_eq!(outcome, CollectionOutcome::NotesUpdated);
        assert_eq!(inst.status, InstallmentStatus::Upcoming);
        assert_eq!(inst.paid_amount, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_empty_and_non_positive_requests() {
        let mut inst = installment(dec!(1000));
        let before = inst.clone();
        for request in [
            CollectRequest::default(),
            CollectRequest::amount(Decimal::ZERO),
            CollectRequest::amount(dec!(-5)),
        ] {
            let err = apply_collection(RepaymentStrategy::Emi, &mut inst, request, today())
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation { .. }));
        }
        assert_eq!(inst, before);
    }

    #[test]
    fn test_amount_rounded_to_cents() {
        let mut inst = installment(dec!(1000));
        apply_collection(
            RepaymentStrategy::Emi,
            &mut inst,
            CollectRequest::amount(dec!(100.005)),
            today(),
        )
        .unwrap();
        assert_eq!(inst.paid_amount, dec!(100.01));
    }
}
