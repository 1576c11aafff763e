//! Borrower commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use tabled::Tabled;

use lendbook_core::types::{Borrower, BorrowerId, NewBorrower};

use crate::cli::OutputFormat;
use crate::commands::loan::print_loans;
use crate::commands::Context;
use crate::output::{
    opt, print_header, print_json, print_list, print_single, print_success, KeyValue,
};

/// Arguments for the borrower command.
#[derive(Args, Debug)]
pub struct BorrowerArgs {
    #[command(subcommand)]
    pub command: BorrowerCommand,
}

/// Borrower subcommands.
#[derive(Subcommand, Debug)]
pub enum BorrowerCommand {
    /// Register a borrower
    Add(AddArgs),

    /// List borrowers
    List,

    /// Show a borrower with their loans and defaulter status
    Show {
        /// Borrower ID
        id: BorrowerId,
    },

    /// Delete a borrower and everything recorded against them
    Delete {
        /// Borrower ID
        id: BorrowerId,
    },
}

/// Arguments for `borrower add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Full name
    #[arg(short, long)]
    pub name: String,

    /// Contact phone
    #[arg(short, long)]
    pub phone: Option<String>,

    /// Postal address
    #[arg(short, long)]
    pub address: Option<String>,

    /// Guarantor name
    #[arg(long)]
    pub guarantor_name: Option<String>,

    /// Guarantor phone
    #[arg(long)]
    pub guarantor_phone: Option<String>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Tabled)]
struct BorrowerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Guarantor")]
    guarantor: String,
    #[tabled(rename = "Since")]
    created_on: String,
}

impl BorrowerRow {
    fn new(b: &Borrower) -> Self {
        Self {
            id: b.id.to_string(),
            name: b.name.clone(),
            phone: opt(b.phone.as_deref()),
            guarantor: opt(b.guarantor_name.as_deref()),
            created_on: b.created_on.to_string(),
        }
    }
}

fn borrower_fields(b: &Borrower) -> Vec<KeyValue> {
    vec![
        KeyValue::new("ID", b.id.to_string()),
        KeyValue::new("Name", b.name.clone()),
        KeyValue::opt("Phone", b.phone.as_deref()),
        KeyValue::opt("Address", b.address.as_deref()),
        KeyValue::opt("Guarantor", b.guarantor_name.as_deref()),
        KeyValue::opt("Guarantor phone", b.guarantor_phone.as_deref()),
        KeyValue::opt("Notes", b.notes.as_deref()),
        KeyValue::new("Since", b.created_on.to_string()),
    ]
}

/// Execute the borrower command.
pub fn execute(args: BorrowerArgs, ctx: &Context) -> Result<()> {
    match args.command {
        BorrowerCommand::Add(add) => {
            let borrower = ctx.book.create_borrower(NewBorrower {
                name: add.name,
                phone: add.phone,
                address: add.address,
                guarantor_name: add.guarantor_name,
                guarantor_phone: add.guarantor_phone,
                notes: add.notes,
            })?;
            print_single(
                &borrower,
                ctx.format,
                || borrower_fields(&borrower),
                borrower.id.to_string(),
            )?;
        }
        BorrowerCommand::List => {
            let borrowers = ctx.book.list_borrowers()?;
            print_list(&borrowers, ctx.format, BorrowerRow::new, |b| b.id.to_string())?;
        }
        BorrowerCommand::Show { id } => {
            let borrower = ctx.book.get_borrower(&id)?;
            let loans = ctx.book.loans_for_borrower(&id)?;
            let status = ctx.book.borrower_status(&id)?;

            match ctx.format {
                OutputFormat::Json => {
                    print_json(&serde_json::json!({
                        "borrower": borrower,
                        "loans": loans,
                        "status": status,
                    }))?;
                }
                _ => {
                    print_single(
                        &borrower,
                        ctx.format,
                        || {
                            let mut fields = borrower_fields(&borrower);
                            fields.push(KeyValue::new(
                                "Defaulter",
                                if status.is_defaulter { "yes" } else { "no" },
                            ));
                            if status.is_defaulter {
                                fields.push(KeyValue::new(
                                    "Defaulted loans",
                                    status.defaulted_loans.to_string(),
                                ));
                                fields.push(KeyValue::money(
                                    "Overdue amount",
                                    status.total_overdue_amount,
                                ));
                                fields.push(KeyValue::new(
                                    "Max days overdue",
                                    status.max_days_overdue.to_string(),
                                ));
                            }
                            fields
                        },
                        borrower.id.to_string(),
                    )?;
                    if ctx.format == OutputFormat::Table {
                        print_header("Loans");
                        print_loans(&loans, ctx.format)?;
                    }
                }
            }
        }
        BorrowerCommand::Delete { id } => {
            if ctx.book.delete_borrower(&id)? {
                print_success(&format!("Deleted borrower {id}"));
            } else {
                anyhow::bail!("borrower not found: {id}");
            }
        }
    }
    Ok(())
}
