//! Installment commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use rust_decimal::Decimal;
use tabled::Tabled;

use lendbook_core::types::{Date, Installment, InstallmentId, LoanId};

use crate::cli::OutputFormat;
use crate::commands::Context;
use crate::output::{money, opt, print_list, print_single, print_success, KeyValue};

/// Arguments for the installment command.
#[derive(Args, Debug)]
pub struct InstallmentArgs {
    #[command(subcommand)]
    pub command: InstallmentCommand,
}

/// Installment subcommands.
#[derive(Subcommand, Debug)]
pub enum InstallmentCommand {
    /// Append an installment to a loan
    Add {
        /// Loan ID
        loan: LoanId,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Date,
        /// Scheduled amount
        #[arg(short, long)]
        amount: Decimal,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List a loan's installments
    List {
        /// Loan ID
        loan: LoanId,
    },

    /// Append the next monthly installment of a flat loan
    Extend {
        /// Loan ID
        loan: LoanId,
    },

    /// Delete an installment and its transactions
    Delete {
        /// Installment ID
        id: InstallmentId,
    },
}

#[derive(Tabled)]
struct InstallmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Paid on")]
    paid_on: String,
}

impl InstallmentRow {
    fn new(i: &Installment, today: Date) -> Self {
        let status = if i.is_overdue(today) {
            format!("{} (overdue)", i.status).red().to_string()
        } else if i.is_collected() {
            i.status.to_string().green().to_string()
        } else {
            i.status.to_string()
        };
        Self {
            id: i.id.to_string(),
            due: i.due_date.to_string(),
            amount: money(i.amount),
            paid: money(i.paid_amount),
            balance: money(i.due_amount),
            status,
            paid_on: opt(i.paid_date),
        }
    }
}

/// Prints installments; overdue ones are highlighted in table output.
pub fn print_installments(
    installments: &[Installment],
    format: OutputFormat,
    today: Date,
) -> Result<()> {
    print_list(
        installments,
        format,
        |i| InstallmentRow::new(i, today),
        |i| i.id.to_string(),
    )
}

/// Key/value view of one installment.
pub fn installment_fields(i: &Installment) -> Vec<KeyValue> {
    vec![
        KeyValue::new("ID", i.id.to_string()),
        KeyValue::new("Loan", i.loan_id.to_string()),
        KeyValue::new("Due", i.due_date.to_string()),
        KeyValue::money("Amount", i.amount),
        KeyValue::money("Paid", i.paid_amount),
        KeyValue::money("Balance", i.due_amount),
        KeyValue::new("Status", i.status.to_string()),
        KeyValue::opt("Paid on", i.paid_date),
        KeyValue::opt("Method", i.payment_method.as_deref()),
        KeyValue::opt("Notes", i.notes.as_deref()),
    ]
}

fn print_installment(i: &Installment, format: OutputFormat) -> Result<()> {
    print_single(i, format, || installment_fields(i), i.id.to_string())
}

/// Execute the installment command.
pub fn execute(args: InstallmentArgs, ctx: &Context) -> Result<()> {
    match args.command {
        InstallmentCommand::Add {
            loan,
            due,
            amount,
            notes,
        } => {
            let inst = ctx.book.add_installment(&loan, due, amount, notes)?;
            print_installment(&inst, ctx.format)?;
        }
        InstallmentCommand::List { loan } => {
            let installments = ctx.book.list_installments(&loan)?;
            print_installments(&installments, ctx.format, ctx.book.today())?;
        }
        InstallmentCommand::Extend { loan } => {
            let inst = ctx.book.extend_flat_schedule(&loan)?;
            print_installment(&inst, ctx.format)?;
        }
        InstallmentCommand::Delete { id } => {
            if ctx.book.delete_payment(&id)? {
                print_success(&format!("Deleted installment {id}"));
            } else {
                anyhow::bail!("installment not found: {id}");
            }
        }
    }
    Ok(())
}
