//! Money rounding helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places every stored amount carries.
pub const MONEY_DP: u32 = 2;

/// Rounds an amount to two decimal places, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `max(0, scheduled - paid)`, rounded.
#[must_use]
pub fn outstanding(scheduled: Decimal, paid: Decimal) -> Decimal {
    round_money((scheduled - paid).max(Decimal::ZERO))
}
