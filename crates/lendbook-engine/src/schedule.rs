//! Schedule generation.
//!
//! Every repayment strategy answers the same questions through
//! [`StrategyRules`]: which installments a new loan starts with and whether
//! the loan completes by itself once everything is collected.
//!
//! | Strategy      | Initial schedule                                | Auto-complete |
//! |---------------|-------------------------------------------------|---------------|
//! | `emi`         | `tenure` monthly installments from start + 1    | yes           |
//! | `flat`        | one installment at start + 1 month              | no            |
//! | `custom`      | none                                            | no            |
//! | `gold_silver` | none                                            | no            |

use rust_decimal::Decimal;

use lendbook_core::types::{round_money, Date, Installment, Loan, RepaymentStrategy};
use lendbook_core::{LedgerError, LedgerResult};

use crate::config::ScheduleConfig;

/// Per-strategy lifecycle rules.
pub trait StrategyRules {
    /// Installments created together with a new loan.
    fn initial_schedule(&self, loan: &Loan, config: &ScheduleConfig)
        -> LedgerResult<Vec<Installment>>;

    /// Whether the completion evaluator may mark the loan completed.
    fn completes_automatically(&self) -> bool;
}

impl StrategyRules for RepaymentStrategy {
    fn initial_schedule(
        &self,
        loan: &Loan,
        config: &ScheduleConfig,
    ) -> LedgerResult<Vec<Installment>> {
        match self {
            RepaymentStrategy::Emi => emi_schedule(loan, config),
            RepaymentStrategy::Flat => Ok(vec![flat_installment_after(
                loan,
                loan.start_date,
                config,
            )?]),
            RepaymentStrategy::Custom
            | RepaymentStrategy::GoldSilver
            | RepaymentStrategy::Unrecognized => Ok(Vec::new()),
        }
    }

    fn completes_automatically(&self) -> bool {
        matches!(self, RepaymentStrategy::Emi)
    }
}

/// Builds the initial installment list for a freshly created loan.
///
/// The loan is not persisted here; callers store the result in the same
/// unit of work as the loan row.
pub fn generate_schedule(loan: &Loan, config: &ScheduleConfig) -> LedgerResult<Vec<Installment>> {
    loan.strategy.initial_schedule(loan, config)
}

/// Per-installment amount of an EMI loan.
pub fn emi_amount(loan: &Loan, config: &ScheduleConfig) -> Decimal {
    match loan.custom_emi_amount {
        Some(amount) => round_money(amount),
        None => {
            let tenure = Decimal::from(emi_tenure(loan, config).max(1));
            round_money(loan.principal / tenure)
        }
    }
}

/// Monthly amount of a flat loan.
pub fn flat_amount(loan: &Loan, config: &ScheduleConfig) -> Decimal {
    match loan.flat_monthly_amount {
        Some(amount) => round_money(amount),
        None => round_money(loan.principal * config.flat_default_rate),
    }
}

fn emi_tenure(loan: &Loan, config: &ScheduleConfig) -> u32 {
    loan.tenure_months.unwrap_or(config.default_tenure_months)
}

fn emi_schedule(loan: &Loan, config: &ScheduleConfig) -> LedgerResult<Vec<Installment>> {
    let tenure = emi_tenure(loan, config);
    let amount = emi_amount(loan, config);

    (1..=tenure)
        .map(|k| {
            let months = i32::try_from(k)
                .map_err(|_| LedgerError::validation(format!("tenure {tenure} is too long")))?;
            let due = loan.start_date.add_months(months)?;
            Ok(Installment::scheduled(loan.id, due, amount))
        })
        .collect()
}

fn flat_installment_after(
    loan: &Loan,
    after: Date,
    config: &ScheduleConfig,
) -> LedgerResult<Installment> {
    let due = after.add_months(1)?;
    Ok(Installment::scheduled(loan.id, due, flat_amount(loan, config)))
}

/// The next installment of a flat loan, one month after the latest existing
/// due date (or after the start date when the loan has none).
pub fn next_flat_installment(
    loan: &Loan,
    existing: &[Installment],
    config: &ScheduleConfig,
) -> LedgerResult<Installment> {
    if loan.strategy != RepaymentStrategy::Flat {
        return Err(LedgerError::validation(format!(
            "only flat loans can be extended, loan {} is {}",
            loan.id, loan.strategy
        )));
    }
    let anchor = existing
        .iter()
        .map(|i| i.due_date)
        .max()
        .unwrap_or(loan.start_date);
    flat_installment_after(loan, anchor, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbook_core::types::{
        BorrowerId, CollateralItem, CollateralKind, InstallmentStatus, LoanId, NewLoan,
    };
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn loan(strategy: RepaymentStrategy, principal: Decimal) -> NewLoan {
        NewLoan::new(BorrowerId::new(), principal, strategy, date(2025, 1, 15))
    }

    #[test]
    fn test_emi_default_tenure() {
        let loan = loan(RepaymentStrategy::Emi, dec!(12000)).into_loan(LoanId::new());
        let schedule = generate_schedule(&loan, &ScheduleConfig::default()).unwrap();

        assert_eq!(schedule.len(), 12);
        for (k, inst) in schedule.iter().enumerate() {
            assert_eq!(inst.amount, dec!(1000));
            assert_eq!(inst.due_amount, dec!(1000));
            assert_eq!(inst.paid_amount, Decimal::ZERO);
            assert_eq!(inst.status, InstallmentStatus::Upcoming);
            assert_eq!(inst.loan_id, loan.id);
            assert_eq!(inst.due_date, date(2025, 1, 15).add_months(k as i32 + 1).unwrap());
        }
        assert_eq!(schedule[0].due_date, date(2025, 2, 15));
        assert_eq!(schedule[11].due_date, date(2026, 1, 15));
    }

    #[test]
    fn test_emi_custom_amount_and_tenure() {
        let loan = loan(RepaymentStrategy::Emi, dec!(10000))
            .with_tenure(3)
            .with_custom_emi(dec!(3500))
            .into_loan(LoanId::new());
        let schedule = generate_schedule(&loan, &ScheduleConfig::default()).unwrap();

        assert_eq!(schedule.len(), 3);
        assert!(schedule.iter().all(|i| i.amount == dec!(3500)));
    }

    #[test]
    fn test_emi_amount_rounds_half_away_from_zero() {
        let config = ScheduleConfig::default();
        let thirds = loan(RepaymentStrategy::Emi, dec!(1000))
            .with_tenure(3)
            .into_loan(LoanId::new());
        assert_eq!(emi_amount(&thirds, &config), dec!(333.33));

        let halves = loan(RepaymentStrategy::Emi, dec!(0.25))
            .with_tenure(2)
            .into_loan(LoanId::new());
        assert_eq!(emi_amount(&halves, &config), dec!(0.13));
    }

    #[test]
    fn test_emi_month_end_clamps() {
        let loan = NewLoan::new(
            BorrowerId::new(),
            dec!(3000),
            RepaymentStrategy::Emi,
            date(2024, 1, 31),
        )
        .with_tenure(3)
        .into_loan(LoanId::new());
        let schedule = generate_schedule(&loan, &ScheduleConfig::default()).unwrap();
        let dues: Vec<_> = schedule.iter().map(|i| i.due_date).collect();

        assert_eq!(dues, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_flat_default_rate() {
        let loan = loan(RepaymentStrategy::Flat, dec!(10000)).into_loan(LoanId::new());
        let schedule = generate_schedule(&loan, &ScheduleConfig::default()).unwrap();

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].amount, dec!(1000));
        assert_eq!(schedule[0].due_date, date(2025, 2, 15));
    }

    #[test]
    fn test_flat_explicit_amount() {
        let loan = loan(RepaymentStrategy::Flat, dec!(10000))
            .with_flat_monthly(dec!(750))
            .into_loan(LoanId::new());
        let schedule = generate_schedule(&loan, &ScheduleConfig::default()).unwrap();

        assert_eq!(schedule[0].amount, dec!(750));
    }

    #[test]
    fn test_manual_strategies_start_empty() {
        let item = CollateralItem {
            kind: CollateralKind::Gold,
            description: "chain".into(),
            weight_grams: dec!(12.5),
            purity: Some("22K".into()),
            estimated_value: None,
        };
        for request in [
            loan(RepaymentStrategy::Custom, dec!(5000)),
            loan(RepaymentStrategy::GoldSilver, dec!(5000)).with_collateral(item),
            loan(RepaymentStrategy::Unrecognized, dec!(5000)),
        ] {
            let loan = request.into_loan(LoanId::new());
            assert!(generate_schedule(&loan, &ScheduleConfig::default())
                .unwrap()
                .is_empty());
        }
    }

    #[test]
    fn test_next_flat_installment() {
        let loan = loan(RepaymentStrategy::Flat, dec!(10000)).into_loan(LoanId::new());
        let config = ScheduleConfig::default();
        let first = generate_schedule(&loan, &config).unwrap();

        let next = next_flat_installment(&loan, &first, &config).unwrap();
        assert_eq!(next.due_date, date(2025, 3, 15));
        assert_eq!(next.amount, dec!(1000));

        let from_empty = next_flat_installment(&loan, &[], &config).unwrap();
        assert_eq!(from_empty.due_date, date(2025, 2, 15));
    }

    #[test]
    fn test_next_flat_rejects_other_strategies() {
        let loan = loan(RepaymentStrategy::Emi, dec!(10000)).into_loan(LoanId::new());
        let err = next_flat_installment(&loan, &[], &ScheduleConfig::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
    }

    #[test]
    fn test_rules() {
        assert!(RepaymentStrategy::Emi.completes_automatically());
        assert!(!RepaymentStrategy::Flat.completes_automatically());
        assert!(!RepaymentStrategy::GoldSilver.completes_automatically());
    }
}
