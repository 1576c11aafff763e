//! Collect and reset commands.

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;

use lendbook_core::types::{Date, InstallmentId, InstallmentStatus};
use lendbook_engine::CollectRequest;

use crate::commands::installment::installment_fields;
use crate::commands::Context;
use crate::error::CliError;
use crate::output::print_single;

/// Arguments for the collect command.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Installment ID
    pub installment: InstallmentId,

    /// Amount received now
    #[arg(short, long, conflicts_with = "full")]
    pub amount: Option<Decimal>,

    /// Collect whatever is still due
    #[arg(long)]
    pub full: bool,

    /// Payment method (cash, upi, bank, ...)
    #[arg(short, long)]
    pub method: Option<String>,

    /// Date the money was received (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<Date>,

    /// Notes
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl CollectArgs {
    fn into_request(self) -> Result<CollectRequest, CliError> {
        if self.amount.is_none() && !self.full && self.notes.is_none() {
            return Err(CliError::MissingArgument(
                "--amount, --full or --notes".to_string(),
            ));
        }
        Ok(CollectRequest {
            amount: self.amount,
            payment_method: self.method,
            paid_date: self.date,
            notes: self.notes,
            status: self.full.then_some(InstallmentStatus::Collected),
        })
    }
}

/// Execute the collect command.
pub fn execute(args: CollectArgs, ctx: &Context) -> Result<()> {
    let id = args.installment;
    let inst = ctx.book.collect_payment(&id, args.into_request()?)?;
    print_single(&inst, ctx.format, || installment_fields(&inst), inst.id.to_string())
}

/// Execute the reset command.
pub fn reset(id: InstallmentId, ctx: &Context) -> Result<()> {
    let inst = ctx.book.reset_payment(&id)?;
    print_single(&inst, ctx.format, || installment_fields(&inst), inst.id.to_string())
}
