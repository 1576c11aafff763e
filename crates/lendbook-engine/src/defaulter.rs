//! Defaulter classification.
//!
//! A loan is a defaulter when, walking its installments in due-date order,
//! some run of consecutive overdue installments reaches the streak
//! threshold (2 by default). "Today" is always an explicit argument.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lendbook_core::types::{BorrowerId, Date, Installment, Loan, LoanId, LoanStatus};

use crate::config::ClassifierConfig;

/// Incremental fold over installments in ascending due-date order.
///
/// Feed installments one at a time with [`StreakCounter::observe`]; the
/// derived fields are available at any point without a rescan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakCounter {
    current: u32,
    max: u32,
    overdue_count: u32,
    overdue_amount: Decimal,
    oldest_overdue: Option<Date>,
}

impl StreakCounter {
    /// An empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the fold by one installment.
    pub fn observe(&mut self, installment: &Installment, today: Date) {
        if installment.is_overdue(today) {
            self.current += 1;
            self.max = self.max.max(self.current);
            self.overdue_count += 1;
            self.overdue_amount += installment.amount;
            self.oldest_overdue = Some(match self.oldest_overdue {
                Some(d) => d.min(installment.due_date),
                None => installment.due_date,
            });
        } else {
            self.current = 0;
        }
    }

    /// Length of the run ending at the last observed installment.
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Longest run seen so far.
    pub fn max_streak(&self) -> u32 {
        self.max
    }

    /// Number of overdue installments seen.
    pub fn overdue_count(&self) -> u32 {
        self.overdue_count
    }

    /// Sum of scheduled amounts of overdue installments.
    pub fn overdue_amount(&self) -> Decimal {
        self.overdue_amount
    }

    /// Earliest due date among overdue installments.
    pub fn oldest_overdue(&self) -> Option<Date> {
        self.oldest_overdue
    }

    /// Whole days the oldest overdue installment is past due.
    pub fn max_days_overdue(&self, today: Date) -> i64 {
        self.oldest_overdue
            .map_or(0, |due| due.days_between(&today).max(0))
    }

    /// Whether the longest run reaches `threshold`.
    pub fn is_defaulter(&self, threshold: u32) -> bool {
        self.max >= threshold
    }
}

fn fold_sorted(installments: &[Installment], today: Date) -> StreakCounter {
    let mut ordered: Vec<&Installment> = installments.iter().collect();
    ordered.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));

    let mut counter = StreakCounter::new();
    for inst in ordered {
        counter.observe(inst, today);
    }
    counter
}

/// Whether the installments contain a run of at least `threshold`
/// consecutive overdue entries. Order of the input does not matter.
pub fn is_defaulted(installments: &[Installment], today: Date, config: &ClassifierConfig) -> bool {
    fold_sorted(installments, today).is_defaulter(config.streak_threshold)
}

/// Classification of one loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAssessment {
    /// Assessed loan.
    pub loan_id: LoanId,
    /// Whether the loan counts as a defaulter.
    pub is_defaulter: bool,
    /// Longest run of consecutive overdue installments.
    pub max_consecutive_missed: u32,
    /// Overdue installments.
    pub overdue_installments: u32,
    /// Sum of scheduled amounts of overdue installments.
    pub overdue_amount: Decimal,
    /// Whole days the oldest overdue installment is past due.
    pub max_days_overdue: i64,
}

/// Classifies a loan. Completed loans are never defaulters.
pub fn assess_loan(
    loan: &Loan,
    installments: &[Installment],
    today: Date,
    config: &ClassifierConfig,
) -> LoanAssessment {
    let counter = fold_sorted(installments, today);
    LoanAssessment {
        loan_id: loan.id,
        is_defaulter: loan.status != LoanStatus::Completed
            && counter.is_defaulter(config.streak_threshold),
        max_consecutive_missed: counter.max_streak(),
        overdue_installments: counter.overdue_count(),
        overdue_amount: counter.overdue_amount(),
        max_days_overdue: counter.max_days_overdue(today),
    }
}

/// Aggregated classification of a borrower over all their loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerAssessment {
    /// Assessed borrower.
    pub borrower_id: BorrowerId,
    /// Whether any non-completed loan is a defaulter.
    pub is_defaulter: bool,
    /// Number of defaulted loans.
    pub defaulted_loans: usize,
    /// Sum of the longest runs across defaulted loans.
    pub total_consecutive_missed: u32,
    /// Sum of overdue installment amounts across defaulted loans.
    pub total_overdue_amount: Decimal,
    /// Days past due of the most overdue installment on a defaulted loan.
    pub max_days_overdue: i64,
}

/// Aggregates loan assessments for one borrower.
pub fn assess_borrower<'a>(
    borrower_id: BorrowerId,
    loans: impl IntoIterator<Item = &'a LoanAssessment>,
) -> BorrowerAssessment {
    let mut out = BorrowerAssessment {
        borrower_id,
        is_defaulter: false,
        defaulted_loans: 0,
        total_consecutive_missed: 0,
        total_overdue_amount: Decimal::ZERO,
        max_days_overdue: 0,
    };
    for loan in loans.into_iter().filter(|l| l.is_defaulter) {
        out.is_defaulter = true;
        out.defaulted_loans += 1;
        out.total_consecutive_missed += loan.max_consecutive_missed;
        out.total_overdue_amount += loan.overdue_amount;
        out.max_days_overdue = out.max_days_overdue.max(loan.max_days_overdue);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbook_core::types::{NewLoan, RepaymentStrategy};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(m: u32, d: u32) -> Date {
        Date::from_ymd(2025, m, d).unwrap()
    }

    fn emi_loan() -> Loan {
        NewLoan::new(BorrowerId::new(), dec!(3000), RepaymentStrategy::Emi, date(1, 1))
            .into_loan(LoanId::new())
    }

    /// Installments due on the 1st of Feb.. with the given collected flags.
    fn installments(loan: &Loan, collected: &[bool]) -> Vec<Installment> {
        collected
            .iter()
            .enumerate()
            .map(|(k, done)| {
                let mut inst =
                    Installment::scheduled(loan.id, date(k as u32 + 2, 1), dec!(1000));
                if *done {
                    inst.apply_paid_total(dec!(1000));
                }
                inst
            })
            .collect()
    }

    #[test]
    fn test_two_consecutive_missed() {
        let loan = emi_loan();
        let insts = installments(&loan, &[false, false, true]);
        let today = date(6, 1);

        assert!(is_defaulted(&insts, today, &ClassifierConfig::default()));
        let a = assess_loan(&loan, &insts, today, &ClassifierConfig::default());
        assert!(a.is_defaulter);
        assert_eq!(a.max_consecutive_missed, 2);
        assert_eq!(a.overdue_amount, dec!(2000));
        assert_eq!(a.max_days_overdue, date(2, 1).days_between(&today));
    }

    #[test]
    fn test_non_consecutive_missed() {
        let loan = emi_loan();
        let insts = installments(&loan, &[false, true, false]);
        assert!(!is_defaulted(&insts, date(6, 1), &ClassifierConfig::default()));
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let loan = emi_loan();
        let insts = installments(&loan, &[false, false]);
        assert!(!is_defaulted(&insts, date(3, 1), &ClassifierConfig::default()));
        assert!(is_defaulted(&insts, date(3, 2), &ClassifierConfig::default()));
    }

    #[test]
    fn test_partial_payment_still_overdue() {
        let loan = emi_loan();
        let mut insts = installments(&loan, &[false, false]);
        insts[0].apply_paid_total(dec!(999));
        assert!(is_defaulted(&insts, date(6, 1), &ClassifierConfig::default()));
    }

    #[test]
    fn test_completed_loan_never_defaulter() {
        let mut loan = emi_loan();
        loan.status = LoanStatus::Completed;
        let insts = installments(&loan, &[false, false]);
        assert!(!assess_loan(&loan, &insts, date(6, 1), &ClassifierConfig::default()).is_defaulter);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let loan = emi_loan();
        let mut insts = installments(&loan, &[false, true, false, false]);
        insts.reverse();
        let a = assess_loan(&loan, &insts, date(8, 1), &ClassifierConfig::default());
        assert_eq!(a.max_consecutive_missed, 2);
    }

    #[test]
    fn test_custom_threshold() {
        let loan = emi_loan();
        let insts = installments(&loan, &[false, false]);
        let strict = ClassifierConfig { streak_threshold: 3 };
        assert!(!is_defaulted(&insts, date(6, 1), &strict));
    }

    #[test]
    fn test_borrower_aggregation() {
        let borrower = BorrowerId::new();
        let today = date(8, 1);
        let config = ClassifierConfig::default();

        let a = emi_loan();
        let b = emi_loan();
        let c = emi_loan();
        let assessments = [
            assess_loan(&a, &installments(&a, &[false, false, false]), today, &config),
            assess_loan(&b, &installments(&b, &[true, false, false]), today, &config),
            assess_loan(&c, &installments(&c, &[false, true, false]), today, &config),
        ];

        let agg = assess_borrower(borrower, &assessments);
        assert!(agg.is_defaulter);
        assert_eq!(agg.defaulted_loans, 2);
        assert_eq!(agg.total_consecutive_missed, 5);
        assert_eq!(agg.total_overdue_amount, dec!(5000));
        assert_eq!(agg.max_days_overdue, date(2, 1).days_between(&today));
    }

    #[test]
    fn test_borrower_without_loans() {
        let agg = assess_borrower(BorrowerId::new(), &[]);
        assert!(!agg.is_defaulter);
        assert_eq!(agg.total_overdue_amount, Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_streak_matches_longest_run(collected in proptest::collection::vec(any::<bool>(), 0..10)) {
            let loan = emi_loan();
            let insts = installments(&loan, &collected);
            let today = Date::from_ymd(2026, 1, 1).unwrap();

            let mut longest = 0u32;
            let mut run = 0u32;
            for done in &collected {
                run = if *done { 0 } else { run + 1 };
                longest = longest.max(run);
            }

            let a = assess_loan(&loan, &insts, today, &ClassifierConfig::default());
            prop_assert_eq!(a.max_consecutive_missed, longest);
            prop_assert_eq!(a.is_defaulter, longest >= 2);
        }
    }
}
