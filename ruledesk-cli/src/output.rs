//! Terminal output
//!
//! Confirmations go to stdout; warnings and failures go to stderr so that
//! `--json` output stays machine-readable.

use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg.green());
}

pub fn failure(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg.red());
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg.yellow());
}

pub fn note(msg: &str) {
    println!("{}", msg.dimmed());
}

/// Compact table with the given header row
pub fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// Show a secret setting without revealing it
pub fn secret_state(value: Option<&str>) -> &'static str {
    match value {
        Some(_) => "set",
        None => "not set",
    }
}
