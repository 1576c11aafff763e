//! Output formatting utilities.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;

/// Prints a list: a table of rows, the records as JSON, or one id per line.
pub fn print_list<T, R>(
    items: &[T],
    format: OutputFormat,
    to_row: impl Fn(&T) -> R,
    id: impl Fn(&T) -> String,
) -> anyhow::Result<()>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(to_row).collect();
            print_table(&rows);
        }
        OutputFormat::Json => print_json(items)?,
        OutputFormat::Minimal => {
            for item in items {
                println!("{}", id(item));
            }
        }
    }
    Ok(())
}

/// Prints a single record as key/value pairs, JSON, or just its id.
pub fn print_single<T: Serialize>(
    data: &T,
    format: OutputFormat,
    fields: impl FnOnce() -> Vec<KeyValue>,
    id: String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(&fields()),
        OutputFormat::Json => print_json(data)?,
        OutputFormat::Minimal => println!("{id}"),
    }
    Ok(())
}

/// Prints data as a formatted table.
pub fn print_table<T: Tabled>(data: &[T]) {
    if data.is_empty() {
        println!("No results.");
        return;
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{}", table);
}

/// Prints data as JSON.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Formats an amount with two decimals.
pub fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Formats an optional value, `-` when absent.
pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Prints a success message.
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Prints a header for a section.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Field")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a key-value pair from an amount.
    pub fn money(key: impl Into<String>, value: Decimal) -> Self {
        Self::new(key, money(value))
    }

    /// Creates a key-value pair from an optional value.
    pub fn opt<T: ToString>(key: impl Into<String>, value: Option<T>) -> Self {
        Self::new(key, opt(value))
    }
}
