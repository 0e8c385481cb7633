//! Edit command - change an existing rule and submit it

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ruledesk_core::{MatchMode, RuleDocument};

use crate::output;

use super::{apply_action, apply_condition, get_context, prompt, submit};

#[derive(Args)]
pub struct EditArgs {
    /// Server id of the rule
    pub id: u64,
    /// Rule document as serialized by the server
    #[arg(long = "from", value_name = "FILE")]
    pub document: PathBuf,
    /// Catalog file (defaults to catalogPath from settings)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// New match mode: any or all
    #[arg(long = "match")]
    pub match_mode: Option<MatchMode>,
    /// Append a condition as KEY=VALUE (repeatable)
    #[arg(long = "add-condition", value_name = "KEY=VALUE")]
    pub add_conditions: Vec<String>,
    /// Remove the condition at this position, starting at 1 (repeatable)
    #[arg(long = "remove-condition", value_name = "N")]
    pub remove_conditions: Vec<usize>,
    /// Append an action as KEY=VALUE (repeatable)
    #[arg(long = "add-action", value_name = "KEY=VALUE")]
    pub add_actions: Vec<String>,
    /// Remove the action at this position, starting at 1 (repeatable)
    #[arg(long = "remove-action", value_name = "N")]
    pub remove_actions: Vec<usize>,
    /// Walk through every field interactively
    #[arg(short, long)]
    pub interactive: bool,
    /// Print the request instead of sending it
    #[arg(long)]
    pub dry_run: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: EditArgs) -> Result<()> {
    let ctx = get_context()?;
    let catalogs = ctx.catalogs(args.catalog.as_deref())?;

    let content = std::fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read rule document {}", args.document.display()))?;
    let document: RuleDocument = serde_json::from_str(&content)
        .with_context(|| format!("Invalid rule document {}", args.document.display()))?;

    let mut editor = ctx.edit_rule_editor(catalogs, args.id, &document);

    if args.interactive {
        if !prompt::is_interactive() {
            anyhow::bail!("--interactive needs a terminal");
        }
        prompt::edit_rule(&mut editor)?;
    }

    if let Some(description) = args.description {
        editor.set_description(description);
    }
    if let Some(match_mode) = args.match_mode {
        editor.set_match(match_mode);
    }

    let conditions = editor.rule().conditions().len();
    let warnings = remove_rows(&args.remove_conditions, conditions, "condition", |index| {
        editor.remove_condition(index)
    });
    for warning in warnings {
        output::warning(&warning);
    }
    let actions = editor.rule().actions().len();
    let warnings = remove_rows(&args.remove_actions, actions, "action", |index| {
        editor.remove_action(index)
    });
    for warning in warnings {
        output::warning(&warning);
    }

    for arg in &args.add_conditions {
        editor.add_condition();
        let index = editor.rule().conditions().len() - 1;
        apply_condition(&mut editor, index, arg)?;
    }
    for arg in &args.add_actions {
        editor.add_action();
        let index = editor.rule().actions().len() - 1;
        apply_action(&mut editor, index, arg)?;
    }

    if !editor.is_dirty() && !args.dry_run {
        output::note("No changes to save");
        return Ok(());
    }

    submit(&ctx, &mut editor, "edit", args.dry_run, args.json)
}

/// Remove rows by 1-based position, returning a warning for each refused one
///
/// Positions refer to the rule as loaded, so rows are removed from the back.
fn remove_rows(
    positions: &[usize],
    len: usize,
    noun: &str,
    mut remove: impl FnMut(usize) -> bool,
) -> Vec<String> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let mut warnings = Vec::new();
    for position in sorted {
        if position == 0 || position > len {
            warnings.push(format!("No {} {} (the rule has {})", noun, position, len));
        } else if !remove(position - 1) {
            warnings.push(format!(
                "Kept {} {}: a rule needs at least one {}",
                noun, position, noun
            ));
        }
    }
    warnings
}
