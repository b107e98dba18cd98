//! Table and JSON rendering for command output.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// `--format` choice shared by every listing command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Render rows as a table, or as a JSON array for scripting.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("(no rows)"),
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{table}");
        }
        OutputFormat::Json => match serde_json::to_string_pretty(rows) {
            Ok(json) => println!("{json}"),
            Err(e) => print_error(&format!("Cannot encode rows as JSON: {e}")),
        },
    }
}

/// Paging summary under a table. JSON output stays a bare array.
pub fn print_page_footer(page: u64, page_size: u64, total: u64, format: OutputFormat) {
    if format == OutputFormat::Table {
        let pages = total.div_ceil(page_size.max(1));
        println!("page {page}/{pages}, {page_size} per page, {total} total");
    }
}

pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {value}", format!("{key}:"));
}
