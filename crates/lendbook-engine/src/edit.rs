//! Editing recorded payment transactions.
//!
//! The installment is always re-derived from its transactions after an edit,
//! so `paid_amount` stays equal to the sum of the log.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lendbook_core::types::{round_money, Date, Installment, PaymentTransaction};
use lendbook_core::{LedgerError, LedgerResult};

/// Fields to change on a transaction. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    /// New amount for this transaction.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New paid date.
    #[serde(default)]
    pub paid_date: Option<Date>,
    /// New payment method.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransactionPatch {
    /// Patch that only changes the amount.
    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}

/// Applies `patch` to `transaction` and re-derives `installment`.
///
/// `siblings` are the installment's other transactions (the edited one may
/// be included; it is skipped by id). Unlike collection, the cap applies to
/// every strategy: the edited sum may not exceed the scheduled amount.
pub fn apply_transaction_edit(
    installment: &mut Installment,
    transaction: &mut PaymentTransaction,
    siblings: &[PaymentTransaction],
    patch: TransactionPatch,
) -> LedgerResult<()> {
    let others: Vec<&PaymentTransaction> = siblings
        .iter()
        .filter(|t| t.id != transaction.id)
        .collect();
    let others_total: Decimal = others.iter().map(|t| t.amount).sum();

    let amount = round_money(patch.amount.unwrap_or(transaction.amount));
    if amount < Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "transaction amount cannot be negative, got {amount}"
        )));
    }
    if others_total + amount > installment.amount {
        return Err(LedgerError::invalid_amount(
            installment.amount,
            others_total,
            amount,
        ));
    }

    transaction.amount = amount;
    if let Some(date) = patch.paid_date {
        transaction.paid_date = date;
    }
    if patch.payment_method.is_some() {
        transaction.payment_method = patch.payment_method;
    }
    if patch.notes.is_some() {
        transaction.notes = patch.notes;
    }

    installment.apply_paid_total(others_total + amount);

    // Latest collection drives the installment's paid date and method.
    let latest = others
        .into_iter()
        .chain(std::iter::once(&*transaction))
        .max_by_key(|t| t.paid_date);
    if let Some(latest) = latest {
        installment.paid_date = Some(latest.paid_date);
        installment.payment_method = latest.payment_method.clone();
    }
    Ok(())
}
