//! Payment transaction commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tabled::Tabled;

use lendbook_core::types::{Date, InstallmentId, PaymentTransaction, TransactionId};
use lendbook_engine::TransactionPatch;

use crate::commands::Context;
use crate::output::{money, opt, print_list, print_single, KeyValue};

/// Arguments for the txn command.
#[derive(Args, Debug)]
pub struct TxnArgs {
    #[command(subcommand)]
    pub command: TxnCommand,
}

/// Transaction subcommands.
#[derive(Subcommand, Debug)]
pub enum TxnCommand {
    /// List an installment's transactions, most recent first
    List {
        /// Installment ID
        installment: InstallmentId,
    },

    /// Correct a recorded transaction
    Edit {
        /// Transaction ID
        id: TransactionId,
        /// New amount
        #[arg(short, long)]
        amount: Option<Decimal>,
        /// New paid date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<Date>,
        /// New payment method
        #[arg(short, long)]
        method: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
    },
}

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Paid on")]
    paid_on: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl TransactionRow {
    fn new(t: &PaymentTransaction) -> Self {
        Self {
            id: t.id.to_string(),
            paid_on: t.paid_date.to_string(),
            amount: money(t.amount),
            method: opt(t.payment_method.as_deref()),
            notes: opt(t.notes.as_deref()),
        }
    }
}

/// Execute the txn command.
pub fn execute(args: TxnArgs, ctx: &Context) -> Result<()> {
    match args.command {
        TxnCommand::List { installment } => {
            let records = ctx.book.list_transactions(&installment)?;
            print_list(&records, ctx.format, TransactionRow::new, |t| t.id.to_string())?;
        }
        TxnCommand::Edit {
            id,
            amount,
            date,
            method,
            notes,
        } => {
            let record = ctx.book.update_transaction(
                &id,
                TransactionPatch {
                    amount,
                    paid_date: date,
                    payment_method: method,
                    notes,
                },
            )?;
            print_single(
                &record,
                ctx.format,
                || {
                    vec![
                        KeyValue::new("ID", record.id.to_string()),
                        KeyValue::new("Installment", record.installment_id.to_string()),
                        KeyValue::money("Amount", record.amount),
                        KeyValue::new("Paid on", record.paid_date.to_string()),
                        KeyValue::opt("Method", record.payment_method.as_deref()),
                        KeyValue::opt("Notes", record.notes.as_deref()),
                    ]
                },
                record.id.to_string(),
            )?;
        }
    }
    Ok(())
}
