//! Loan commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tabled::Tabled;

use lendbook_core::types::{
    BorrowerId, CollateralItem, CollateralKind, Date, Loan, LoanId, LoanStatus, NewLoan,
    RepaymentStrategy,
};

use crate::cli::OutputFormat;
use crate::commands::installment::print_installments;
use crate::commands::Context;
use crate::error::{CliError, CliResult};
use crate::output::{
    money, opt, print_header, print_json, print_list, print_single, print_success,
    print_warning, KeyValue,
};

/// Arguments for the loan command.
#[derive(Args, Debug)]
pub struct LoanArgs {
    #[command(subcommand)]
    pub command: LoanCommand,
}

/// Loan subcommands.
#[derive(Subcommand, Debug)]
pub enum LoanCommand {
    /// Create a loan and its initial schedule
    Create(CreateArgs),

    /// Show a loan with its schedule and collection position
    Show {
        /// Loan ID
        id: LoanId,
    },

    /// List loans
    List {
        /// Only loans of this borrower
        #[arg(short, long)]
        borrower: Option<BorrowerId>,
    },

    /// Set a loan's status (active, completed, defaulted, cancelled)
    Status {
        /// Loan ID
        id: LoanId,
        /// New status
        status: LoanStatus,
    },

    /// Delete a loan with its installments and transactions
    Delete {
        /// Loan ID
        id: LoanId,
    },
}

/// Arguments for `loan create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Borrower ID
    #[arg(short, long)]
    pub borrower: BorrowerId,

    /// Principal amount
    #[arg(short, long)]
    pub principal: Decimal,

    /// Repayment strategy: emi, flat, custom or gold_silver
    #[arg(short, long, default_value = "emi")]
    pub strategy: String,

    /// Disbursement date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub start: Option<Date>,

    /// Tenure in months (EMI)
    #[arg(short, long)]
    pub tenure: Option<u32>,

    /// Per-installment amount overriding principal / tenure (EMI)
    #[arg(long)]
    pub emi: Option<Decimal>,

    /// Monthly amount (flat)
    #[arg(long)]
    pub flat_amount: Option<Decimal>,

    /// Pledged item as kind:description:grams[:purity[:value]] (repeatable)
    #[arg(long, value_parser = parse_collateral)]
    pub collateral: Vec<CollateralItem>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,
}

/// Parses `kind:description:grams[:purity[:value]]`.
pub fn parse_collateral(s: &str) -> CliResult<CollateralItem> {
    let invalid = || CliError::InvalidCollateral(s.to_string());
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    if !(3..=5).contains(&parts.len()) {
        return Err(invalid());
    }

    let kind: CollateralKind = parts[0].parse().map_err(|_| invalid())?;
    let weight_grams: Decimal = parts[2].parse().map_err(|_| invalid())?;
    let purity = parts.get(3).filter(|p| !p.is_empty()).map(|p| (*p).to_string());
    let estimated_value = match parts.get(4) {
        Some(v) if !v.is_empty() => Some(v.parse::<Decimal>().map_err(|_| invalid())?),
        _ => None,
    };

    Ok(CollateralItem {
        kind,
        description: parts[1].to_string(),
        weight_grams,
        purity,
        estimated_value,
    })
}

#[derive(Tabled)]
struct LoanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Principal")]
    principal: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl LoanRow {
    fn new(l: &Loan) -> Self {
        Self {
            id: l.id.to_string(),
            strategy: l.strategy.to_string(),
            principal: money(l.principal),
            start: l.start_date.to_string(),
            status: l.status.to_string(),
        }
    }
}

/// Prints loans in the requested format.
pub fn print_loans(loans: &[Loan], format: OutputFormat) -> Result<()> {
    print_list(loans, format, LoanRow::new, |l| l.id.to_string())
}

fn loan_fields(l: &Loan) -> Vec<KeyValue> {
    let mut fields = vec![
        KeyValue::new("ID", l.id.to_string()),
        KeyValue::new("Borrower", l.borrower_id.to_string()),
        KeyValue::new("Strategy", l.strategy.to_string()),
        KeyValue::money("Principal", l.principal),
        KeyValue::new("Start", l.start_date.to_string()),
        KeyValue::opt("Tenure (months)", l.tenure_months),
        KeyValue::new("Custom EMI", opt(l.custom_emi_amount.map(money))),
        KeyValue::new("Flat monthly", opt(l.flat_monthly_amount.map(money))),
        KeyValue::new("Status", l.status.to_string()),
        KeyValue::opt("Notes", l.notes.as_deref()),
    ];
    for item in &l.collateral {
        fields.push(KeyValue::new(
            "Collateral",
            format!(
                "{} {} {}g {}",
                item.kind,
                item.description,
                item.weight_grams,
                opt(item.purity.as_deref())
            ),
        ));
    }
    fields
}

/// Execute the loan command.
pub fn execute(args: LoanArgs, ctx: &Context) -> Result<()> {
    match args.command {
        LoanCommand::Create(create) => {
            let strategy: RepaymentStrategy = create.strategy.parse()?;
            if strategy == RepaymentStrategy::Unrecognized {
                print_warning(&format!(
                    "unknown strategy '{}': the loan gets no installments",
                    create.strategy
                ));
            }

            let start = create.start.unwrap_or_else(|| ctx.book.today());
            let mut request = NewLoan::new(create.borrower, create.principal, strategy, start);
            request.tenure_months = create.tenure;
            request.custom_emi_amount = create.emi;
            request.flat_monthly_amount = create.flat_amount;
            request.notes = create.notes;
            request.collateral = create.collateral;

            let loan = ctx.book.create_loan(request)?;
            print_single(&loan, ctx.format, || loan_fields(&loan), loan.id.to_string())?;
        }
        LoanCommand::Show { id } => {
            let summary = ctx.book.loan_summary(&id)?;
            let installments = ctx.book.list_installments(&id)?;

            match ctx.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "summary": summary,
                    "installments": installments,
                }))?,
                OutputFormat::Minimal => println!("{}", summary.loan.status),
                OutputFormat::Table => {
                    let mut fields = loan_fields(&summary.loan);
                    fields.push(KeyValue::money("Scheduled", summary.total_scheduled));
                    fields.push(KeyValue::money("Paid", summary.total_paid));
                    fields.push(KeyValue::money("Outstanding", summary.outstanding));
                    fields.push(KeyValue::new(
                        "Collected",
                        format!(
                            "{}/{}",
                            summary.installments_collected, summary.installments_total
                        ),
                    ));
                    fields.push(KeyValue::opt(
                        "Next due",
                        summary.next_due.as_ref().map(|i| i.due_date),
                    ));
                    fields.push(KeyValue::new(
                        "Defaulter",
                        if summary.assessment.is_defaulter { "yes" } else { "no" },
                    ));
                    crate::output::print_table(&fields);

                    print_header("Installments");
                    print_installments(&installments, ctx.format, ctx.book.today())?;
                }
            }
        }
        LoanCommand::List { borrower } => {
            let loans = match borrower {
                Some(id) => ctx.book.loans_for_borrower(&id)?,
                None => ctx.book.list_loans()?,
            };
            print_loans(&loans, ctx.format)?;
        }
        LoanCommand::Status { id, status } => {
            let loan = ctx.book.set_loan_status(&id, status)?;
            print_success(&format!("Loan {} is now {}", loan.id, loan.status));
        }
        LoanCommand::Delete { id } => {
            if ctx.book.delete_loan(&id)? {
                print_success(&format!("Deleted loan {id}"));
            } else {
                anyhow::bail!("loan not found: {id}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collateral_full() {
        let item = parse_collateral("gold:bangle pair:24.5:22K:95000").unwrap();
        assert_eq!(item.kind, CollateralKind::Gold);
        assert_eq!(item.description, "bangle pair");
        assert_eq!(item.weight_grams, Decimal::new(245, 1));
        assert_eq!(item.purity.as_deref(), Some("22K"));
        assert_eq!(item.estimated_value, Some(Decimal::new(95000, 0)));
    }

    #[test]
    fn test_parse_collateral_minimal() {
        let item = parse_collateral("silver:anklet:40").unwrap();
        assert_eq!(item.kind, CollateralKind::Silver);
        assert!(item.purity.is_none());
        assert!(item.estimated_value.is_none());
    }

    #[test]
    fn test_parse_collateral_rejects_garbage() {
        assert!(parse_collateral("gold:chain").is_err());
        assert!(parse_collateral("platinum:chain:10").is_err());
        assert!(parse_collateral("gold:chain:heavy").is_err());
    }
}
