//! Catalog command - show the keys and values the editor offers

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use ruledesk_core::domain::{EntrySchema, ACTION_SCHEMA, CONDITION_SCHEMA};
use ruledesk_core::ChoiceCatalog;

use crate::output;

use super::{get_context, prompt::key_options};

pub fn run(catalog: Option<PathBuf>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let catalogs = ctx.catalogs(catalog.as_deref())?;

    if json {
        let value = serde_json::json!({
            "conditions": catalogs.conditions.as_ref(),
            "actions": catalogs.actions.as_ref(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_section("Conditions", &CONDITION_SCHEMA, &catalogs.conditions);
    println!();
    print_section("Actions", &ACTION_SCHEMA, &catalogs.actions);

    if catalogs.conditions.is_empty() && catalogs.actions.is_empty() {
        println!();
        output::warning(
            "No catalog loaded. Every value is free text (pass --catalog or set catalogPath)",
        );
    }
    Ok(())
}

fn print_section(heading: &str, schema: &EntrySchema, catalog: &ChoiceCatalog) {
    println!("{}", heading.bold());

    let mut table = output::table(vec!["Key", "Title", "Input", "Choices"]);
    for (key, title) in key_options(schema, catalog) {
        let input = if schema.is_selectable(&key) { "select" } else { "text" };
        let choices = catalog.choices(&key).join(", ");
        let key_cell = if key == schema.default_key {
            format!("{} *", key)
        } else {
            key.clone()
        };
        table.add_row(vec![key_cell, title, input.to_string(), choices]);
    }
    println!("{}", table);
}
