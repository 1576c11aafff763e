//! Defaulters and dashboard reports.

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use lendbook_engine::DefaulterEntry;

use crate::cli::OutputFormat;
use crate::commands::Context;
use crate::output::{money, opt, print_list, print_single, KeyValue};

#[derive(Tabled)]
struct DefaulterRow {
    #[tabled(rename = "Borrower")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Guarantor")]
    guarantor: String,
    #[tabled(rename = "Loans")]
    loans: usize,
    #[tabled(rename = "Missed")]
    missed: u32,
    #[tabled(rename = "Overdue")]
    overdue: String,
    #[tabled(rename = "Days")]
    days: String,
}

impl DefaulterRow {
    fn new(e: &DefaulterEntry) -> Self {
        Self {
            name: e.borrower.name.clone(),
            phone: opt(e.borrower.phone.as_deref()),
            guarantor: opt(e.borrower.guarantor_name.as_deref()),
            loans: e.assessment.defaulted_loans,
            missed: e.assessment.total_consecutive_missed,
            overdue: money(e.assessment.total_overdue_amount),
            days: e.assessment.max_days_overdue.to_string().red().to_string(),
        }
    }
}

/// Execute the defaulters command.
pub fn defaulters(ctx: &Context) -> Result<()> {
    let entries = ctx.book.defaulters()?;
    print_list(&entries, ctx.format, DefaulterRow::new, |e| {
        e.borrower.id.to_string()
    })
}

/// Execute the dashboard command.
pub fn dashboard(ctx: &Context) -> Result<()> {
    let dash = ctx.book.dashboard()?;
    if ctx.format == OutputFormat::Minimal {
        println!("{}", dash.defaulters);
        return Ok(());
    }
    print_single(
        &dash,
        ctx.format,
        || {
            vec![
                KeyValue::opt("As of", dash.as_of),
                KeyValue::new("Borrowers", dash.borrowers.to_string()),
                KeyValue::new("Active loans", dash.active_loans.to_string()),
                KeyValue::new("Completed loans", dash.completed_loans.to_string()),
                KeyValue::money("Principal disbursed", dash.total_principal),
                KeyValue::money("Collected", dash.total_collected),
                KeyValue::money("Outstanding", dash.total_outstanding),
                KeyValue::new("Overdue installments", dash.overdue_installments.to_string()),
                KeyValue::new("Due in 7 days", dash.due_next_week.to_string()),
                KeyValue::new("Defaulters", dash.defaulters.to_string()),
            ]
        },
        String::new(),
    )
}
