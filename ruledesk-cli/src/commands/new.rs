//! New command - create a rule and submit it

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ruledesk_core::MatchMode;

use super::{apply_action, apply_condition, get_context, prompt, submit};

#[derive(Args)]
pub struct NewArgs {
    /// Catalog file (defaults to catalogPath from settings)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// Rule description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Match mode: any or all
    #[arg(long = "match")]
    pub match_mode: Option<MatchMode>,
    /// Condition as KEY=VALUE (repeatable, in order)
    #[arg(long = "condition", value_name = "KEY=VALUE")]
    pub conditions: Vec<String>,
    /// Action as KEY=VALUE (repeatable, in order)
    #[arg(long = "action", value_name = "KEY=VALUE")]
    pub actions: Vec<String>,
    /// Print the request instead of sending it
    #[arg(long)]
    pub dry_run: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: NewArgs) -> Result<()> {
    let ctx = get_context()?;
    let catalogs = ctx.catalogs(args.catalog.as_deref())?;
    let mut editor = ctx.new_rule_editor(catalogs);

    let has_fields = args.description.is_some()
        || args.match_mode.is_some()
        || !args.conditions.is_empty()
        || !args.actions.is_empty();

    if !has_fields && !args.json && prompt::is_interactive() {
        prompt::edit_rule(&mut editor)?;
    } else {
        if let Some(description) = args.description {
            editor.set_description(description);
        }
        if let Some(match_mode) = args.match_mode {
            editor.set_match(match_mode);
        }
        // The default rule already has one row of each; fill it before adding more
        for (i, arg) in args.conditions.iter().enumerate() {
            if i > 0 {
                editor.add_condition();
            }
            apply_condition(&mut editor, i, arg)?;
        }
        for (i, arg) in args.actions.iter().enumerate() {
            if i > 0 {
                editor.add_action();
            }
            apply_action(&mut editor, i, arg)?;
        }
    }

    submit(&ctx, &mut editor, "new", args.dry_run, args.json)
}
