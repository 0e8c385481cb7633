//! CLI command implementations

pub mod catalog;
pub mod delete;
pub mod edit;
pub mod logs;
pub mod new;
pub mod prompt;
pub mod server;

use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ruledesk_core::ports::{RuleEndpoint, SubmitResponse};
use ruledesk_core::services::RuleEditor;
use ruledesk_core::{
    EntryPoint, Error, LogEvent, LoggingService, OperationResult, RuleDocument, RuleModel,
    RuledeskContext,
};
use serde::Serialize;

use crate::output;

/// Get the logging service for commands that run without a context
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RULEDESK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".ruledesk"))
        .context("Could not find home directory (set RULEDESK_DIR)")
}

/// Get or create the ruledesk context
pub fn get_context() -> Result<RuledeskContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let ctx = RuledeskContext::new(&data_dir).context("Failed to initialize ruledesk context")?;
    Ok(ctx.with_entry_point(EntryPoint::Cli))
}

/// Complete a request event with the server's answer
///
/// Failures are renamed to `failed_event` and carry the error message, the
/// kind of failure and the HTTP status when the server answered.
pub fn outcome_event(
    event: LogEvent,
    failed_event: &str,
    result: &ruledesk_core::domain::result::Result<SubmitResponse>,
) -> LogEvent {
    match result {
        Ok(response) => event.with_http_status(response.status),
        Err(e) => {
            let mut event = event
                .with_error(e.to_string())
                .with_error_details(match e {
                    Error::Transport(_) => "transport",
                    Error::Server { .. } => "server",
                    _ => "client",
                });
            event.event = failed_event.to_string();
            if let Some(status) = e.http_status() {
                event = event.with_http_status(status);
            }
            event
        }
    }
}

/// Parse a `KEY=VALUE` entry argument
///
/// Keys are upper-cased; the value may be empty or contain `=`.
pub fn parse_entry(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg
        .split_once('=')
        .with_context(|| format!("Invalid entry '{}'. Use KEY=VALUE", arg))?;
    let key = key.trim().to_uppercase();
    if key.is_empty() {
        anyhow::bail!("Invalid entry '{}'. Key is empty", arg);
    }
    Ok((key, value.trim().to_string()))
}

/// Set a condition row from a `KEY=VALUE` argument
pub fn apply_condition(editor: &mut RuleEditor, index: usize, arg: &str) -> Result<()> {
    let (key, value) = parse_entry(arg)?;
    if !editor.set_condition_key(index, &key)? {
        output::warning(&format!(
            "Unknown condition key '{}', using {}",
            key,
            editor.rule().conditions()[index].key()
        ));
    }
    editor.set_condition_value(index, value)?;
    Ok(())
}

/// Set an action row from a `KEY=VALUE` argument
pub fn apply_action(editor: &mut RuleEditor, index: usize, arg: &str) -> Result<()> {
    let (key, value) = parse_entry(arg)?;
    if !editor.set_action_key(index, &key)? {
        output::warning(&format!(
            "Unknown action key '{}', using {}",
            key,
            editor.rule().actions()[index].key()
        ));
    }
    editor.set_action_value(index, value)?;
    Ok(())
}

/// Print the rule being edited
pub fn print_rule(rule: &RuleModel) {
    let title = match rule.id {
        Some(id) => format!("Rule #{}: {}", id, rule.description),
        None => rule.description.clone(),
    };
    println!("{}", title.bold());
    println!("  Match: {}", rule.match_mode.title());

    let mut table = output::table(vec!["#", "Type", "Key", "Operator", "Value"]);
    for (i, condition) in rule.conditions().iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            "condition".to_string(),
            condition.key().to_string(),
            condition.operator.to_string(),
            condition.value.clone(),
        ]);
    }
    for (i, action) in rule.actions().iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            "action".to_string(),
            format!("{} ({})", action.key(), action.title),
            String::new(),
            action.value.clone(),
        ]);
    }
    println!("{}", table);
}

#[derive(Serialize)]
struct SaveSummary {
    action_url: String,
    status: u16,
    rule: RuleDocument,
}

#[derive(Serialize)]
struct DryRunSummary {
    action_url: String,
    body: String,
    rule: RuleDocument,
}

/// Submit the editor's rule, or print what would be sent
///
/// Failures are printed inline and end the process with exit code 1.
pub fn submit(
    ctx: &RuledeskContext,
    editor: &mut RuleEditor,
    command: &str,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let logger = ctx.logger().ok();
    log_event(&logger, LogEvent::new("command_executed").with_command(command));

    if dry_run {
        let summary = DryRunSummary {
            action_url: editor.action_url().to_string(),
            body: editor.rule().to_form().encode(),
            rule: editor.rule().to_document(),
        };
        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{}", "DRY RUN - Nothing sent".yellow());
            print_rule(editor.rule());
            println!("POST {}", ctx.endpoint.resolve(&summary.action_url)?);
            println!("{}", summary.body);
        }
        return Ok(());
    }

    let spinner = if json {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(format!("Saving rule to {}", editor.action_url()));
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    };

    let result = editor.save(ctx.endpoint.as_ref());

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let mut event = LogEvent::new("rule_saved")
        .with_command(command)
        .with_endpoint(ctx.endpoint.name());
    if let Some(id) = editor.rule().id {
        event = event.with_rule_id(id);
    }
    log_event(&logger, outcome_event(event, "rule_save_failed", &result));

    match result {
        Ok(response) => {
            let summary = SaveSummary {
                action_url: editor.action_url().to_string(),
                status: response.status,
                rule: editor.rule().to_document(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(summary))?);
            } else {
                output::success(&format!("Rule saved (HTTP {})", response.status));
                print_rule(editor.rule());
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let failed: OperationResult<SaveSummary> = OperationResult::fail(e.to_string());
                println!("{}", serde_json::to_string_pretty(&failed)?);
            } else {
                output::failure(editor.last_error().unwrap_or("Save failed"));
                output::note("The rule was not saved. Nothing was changed on the server.");
            }
            exit(1);
        }
    }
}
