//! Loan records, repayment strategies and collateral.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{BorrowerId, Date, LoanId};
use crate::error::{LedgerError, LedgerResult};

/// Repayment shape of a loan.
///
/// The strategy is fixed at creation. Regenerating a schedule means deleting
/// and recreating the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentStrategy {
    /// Equal monthly installments over a fixed tenure.
    Emi,
    /// Open-ended monthly amount, one installment generated at a time.
    Flat,
    /// Manually curated schedule.
    Custom,
    /// Gold or silver collateral loan with a manually curated schedule.
    GoldSilver,
    /// A strategy name this build does not know; such loans get no schedule.
    #[serde(other)]
    Unrecognized,
}

impl RepaymentStrategy {
    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emi => "emi",
            Self::Flat => "flat",
            Self::Custom => "custom",
            Self::GoldSilver => "gold_silver",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Whether collections against this strategy are capped at the
    /// scheduled installment amount.
    pub fn caps_collection(&self) -> bool {
        !matches!(self, Self::Flat)
    }
}

impl fmt::Display for RepaymentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepaymentStrategy {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(LedgerError::validation("strategy is required")),
            "emi" => Ok(Self::Emi),
            "flat" => Ok(Self::Flat),
            "custom" => Ok(Self::Custom),
            "gold_silver" | "gold-silver" => Ok(Self::GoldSilver),
            _ => Ok(Self::Unrecognized),
        }
    }
}

/// Lifecycle status of a loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Accepting collections.
    #[default]
    Active,
    /// Fully repaid.
    Completed,
    /// Written off as defaulted (set externally).
    Defaulted,
    /// Cancelled (set externally).
    Cancelled,
}

impl LoanStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Defaulted => "defaulted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "defaulted" => Ok(Self::Defaulted),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(LedgerError::validation(format!("unknown loan status: {other}"))),
        }
    }
}

/// Precious metal pledged against a gold/silver loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralKind {
    /// Gold ornament or bullion.
    Gold,
    /// Silver ornament or bullion.
    Silver,
}

impl fmt::Display for CollateralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
        })
    }
}

impl FromStr for CollateralKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(Self::Gold),
            "silver" => Ok(Self::Silver),
            other => Err(LedgerError::validation(format!("unknown collateral kind: {other}"))),
        }
    }
}

/// One pledged collateral item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollateralItem {
    /// Metal.
    pub kind: CollateralKind,
    /// Free-text description ("bangle", "chain", ...).
    pub description: String,
    /// Weight in grams.
    pub weight_grams: Decimal,
    /// Purity marking, e.g. "22K" or "925".
    pub purity: Option<String>,
    /// Appraised value at pledge time.
    pub estimated_value: Option<Decimal>,
}

/// A loan as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Loan identifier.
    pub id: LoanId,
    /// Owning borrower.
    pub borrower_id: BorrowerId,
    /// Principal amount disbursed.
    pub principal: Decimal,
    /// Repayment strategy (immutable).
    pub strategy: RepaymentStrategy,
    /// Disbursement date; schedules count months from here.
    pub start_date: Date,
    /// Tenure in months (EMI only).
    pub tenure_months: Option<u32>,
    /// Per-installment override for EMI loans.
    pub custom_emi_amount: Option<Decimal>,
    /// Monthly amount for flat loans.
    pub flat_monthly_amount: Option<Decimal>,
    /// Lifecycle status.
    pub status: LoanStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Pledged items (gold/silver loans).
    #[serde(default)]
    pub collateral: Vec<CollateralItem>,
}

/// Attributes supplied when creating a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    /// Owning borrower.
    pub borrower_id: BorrowerId,
    /// Principal amount.
    pub principal: Decimal,
    /// Repayment strategy.
    pub strategy: RepaymentStrategy,
    /// Disbursement date.
    pub start_date: Date,
    /// Tenure in months (EMI only).
    #[serde(default)]
    pub tenure_months: Option<u32>,
    /// Per-installment override for EMI loans.
    #[serde(default)]
    pub custom_emi_amount: Option<Decimal>,
    /// Monthly amount for flat loans.
    #[serde(default)]
    pub flat_monthly_amount: Option<Decimal>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Pledged items.
    #[serde(default)]
    pub collateral: Vec<CollateralItem>,
}

impl NewLoan {
    /// Starts a new loan request with the mandatory fields.
    pub fn new(
        borrower_id: BorrowerId,
        principal: Decimal,
        strategy: RepaymentStrategy,
        start_date: Date,
    ) -> Self {
        Self {
            borrower_id,
            principal,
            strategy,
            start_date,
            tenure_months: None,
            custom_emi_amount: None,
            flat_monthly_amount: None,
            notes: None,
            collateral: Vec::new(),
        }
    }

    /// Sets the EMI tenure.
    pub fn with_tenure(mut self, months: u32) -> Self {
        self.tenure_months = Some(months);
        self
    }

    /// Sets a custom per-installment EMI amount.
    pub fn with_custom_emi(mut self, amount: Decimal) -> Self {
        self.custom_emi_amount = Some(amount);
        self
    }

    /// Sets the flat monthly amount.
    pub fn with_flat_monthly(mut self, amount: Decimal) -> Self {
        self.flat_monthly_amount = Some(amount);
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Adds a collateral item.
    pub fn with_collateral(mut self, item: CollateralItem) -> Self {
        self.collateral.push(item);
        self
    }

    /// Checks the request before anything is persisted.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LedgerError::validation("principal must be positive"));
        }
        if self.tenure_months == Some(0) {
            return Err(LedgerError::validation("tenure must be at least one month"));
        }
        if self.custom_emi_amount.is_some_and(|a| a <= Decimal::ZERO) {
            return Err(LedgerError::validation("custom EMI amount must be positive"));
        }
        if self.flat_monthly_amount.is_some_and(|a| a <= Decimal::ZERO) {
            return Err(LedgerError::validation("flat monthly amount must be positive"));
        }
        if self.strategy == RepaymentStrategy::GoldSilver && self.collateral.is_empty() {
            return Err(LedgerError::validation(
                "gold/silver loans need at least one collateral item",
            ));
        }
        if let Some(item) = self
            .collateral
            .iter()
            .find(|i| i.weight_grams <= Decimal::ZERO)
        {
            return Err(LedgerError::validation(format!(
                "collateral '{}' must have a positive weight",
                item.description
            )));
        }
        Ok(())
    }

    /// Materializes the request as an active loan.
    pub fn into_loan(self, id: LoanId) -> Loan {
        Loan {
            id,
            borrower_id: self.borrower_id,
            principal: self.principal,
            strategy: self.strategy,
            start_date: self.start_date,
            tenure_months: self.tenure_months,
            custom_emi_amount: self.custom_emi_amount,
            flat_monthly_amount: self.flat_monthly_amount,
            status: LoanStatus::Active,
            notes: self.notes,
            collateral: self.collateral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn start() -> Date {
        Date::from_ymd(2025, 1, 10).unwrap()
    }

    #[test]
    fn test_strategy_wire_names() {
        assert_eq!("emi".parse::<RepaymentStrategy>().unwrap(), RepaymentStrategy::Emi);
        assert_eq!(
            "gold_silver".parse::<RepaymentStrategy>().unwrap(),
            RepaymentStrategy::GoldSilver
        );
        assert_eq!(
            "balloon".parse::<RepaymentStrategy>().unwrap(),
            RepaymentStrategy::Unrecognized
        );
        assert!("  ".parse::<RepaymentStrategy>().is_err());

        let json = serde_json::to_string(&RepaymentStrategy::GoldSilver).unwrap();
        assert_eq!(json, "\"gold_silver\"");
        let unknown: RepaymentStrategy = serde_json::from_str("\"balloon\"").unwrap();
        assert_eq!(unknown, RepaymentStrategy::Unrecognized);
    }

    #[test]
    fn test_only_flat_is_uncapped() {
        assert!(RepaymentStrategy::Emi.caps_collection());
        assert!(RepaymentStrategy::Custom.caps_collection());
        assert!(RepaymentStrategy::GoldSilver.caps_collection());
        assert!(!RepaymentStrategy::Flat.caps_collection());
    }

    #[test]
    fn test_validate_rejects_bad_requests() {
        let borrower = BorrowerId::new();
        let ok = NewLoan::new(borrower, dec!(12000), RepaymentStrategy::Emi, start());
        assert!(ok.validate().is_ok());

        let zero = NewLoan::new(borrower, dec!(0), RepaymentStrategy::Emi, start());
        assert!(zero.validate().is_err());

        let tenure = ok.clone().with_tenure(0);
        assert!(tenure.validate().is_err());

        let gold = NewLoan::new(borrower, dec!(5000), RepaymentStrategy::GoldSilver, start());
        assert!(gold.validate().is_err());

        let weightless = gold.with_collateral(CollateralItem {
            kind: CollateralKind::Gold,
            description: "chain".into(),
            weight_grams: dec!(0),
            purity: Some("22K".into()),
            estimated_value: None,
        });
        assert!(weightless.validate().is_err());
    }

    #[test]
    fn test_into_loan_starts_active() {
        let loan = NewLoan::new(BorrowerId::new(), dec!(1000), RepaymentStrategy::Flat, start())
            .with_flat_monthly(dec!(150))
            .into_loan(LoanId::new());
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.flat_monthly_amount, Some(dec!(150)));
    }
}
