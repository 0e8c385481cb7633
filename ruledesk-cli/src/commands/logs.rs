//! Logs command - review what ruledesk sent to the rule server

use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use ruledesk_core::services::logging::now_ms;
use ruledesk_core::{EntryPoint, LogEntry, LogFilter, LoggingService};

use crate::output;

use super::get_data_dir;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only events for this rule id
        #[arg(long)]
        rule: Option<u64>,
        /// Only events from this command (new, edit, delete, server)
        #[arg(long)]
        command: Option<String>,
        /// Only failed saves and deletes
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete events older than a number of days
    Clear {
        /// Keep entries newer than this many days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count events by kind
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

/// Short outcome column: HTTP status for requests, the error for failures
fn outcome(entry: &LogEntry) -> String {
    let status = entry.http_status.map(|s| format!("HTTP {}", s));
    match (&entry.error_message, status) {
        (Some(message), Some(status)) => format!("{} {}", status, message).red().to_string(),
        (Some(message), None) => message.red().to_string(),
        (None, Some(status)) => status.green().to_string(),
        (None, None) => String::new(),
    }
}

fn list(filter: LogFilter, json: bool) -> Result<()> {
    let entries = open_log()?.query(&filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        output::note("No log entries found.");
        return Ok(());
    }

    let mut table = output::table(vec!["Time", "Command", "Event", "Rule", "Server", "Outcome"]);
    for entry in &entries {
        table.add_row(vec![
            format_time(entry.timestamp),
            entry.command.clone().unwrap_or_default(),
            entry.event.clone(),
            entry.rule_id.as_ref().map(|id| format!("#{}", id)).unwrap_or_default(),
            entry.endpoint.clone().unwrap_or_default(),
            outcome(entry),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn clear(older_than_days: u64, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete log entries older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            output::note("Cancelled.");
            return Ok(());
        }
    }

    let cutoff_ms = now_ms() - older_than_days as i64 * DAY_MS;
    let deleted = open_log()?.delete_before(cutoff_ms)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        output::success(&format!("Deleted {} log entries", deleted));
    }
    Ok(())
}

fn stats(json: bool) -> Result<()> {
    let log = open_log()?;
    let total = log.count()?;
    let failures = log.error_count()?;
    let by_event = log.event_counts()?;

    if json {
        let events: serde_json::Map<String, serde_json::Value> = by_event
            .iter()
            .map(|(event, count)| (event.clone(), (*count).into()))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "total": total,
                "failures": failures,
                "events": events,
                "database": log.db_path(),
            }))?
        );
        return Ok(());
    }

    println!("{}", "Event log".bold());
    println!("  Entries:  {}", total);
    println!("  Failures: {}", failures);
    println!("  Database: {}", log.db_path().display());
    if !by_event.is_empty() {
        let mut table = output::table(vec!["Event", "Count"]);
        for (event, count) in by_event {
            table.add_row(vec![event, count.to_string()]);
        }
        println!("{}", table);
    }
    Ok(())
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List {
            limit,
            rule,
            command,
            errors,
            json,
        } => list(
            LogFilter {
                limit,
                errors_only: errors,
                rule_id: rule,
                command,
            },
            json,
        ),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(older_than_days, force, json),
        LogsCommands::Stats { json } => stats(json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(http_status: Option<u16>, error: Option<&str>) -> LogEntry {
        LogEntry {
            id: 1,
            timestamp: 0,
            entry_point: "cli".into(),
            app_version: "0.1.0".into(),
            platform: "linux".into(),
            event: "rule_saved".into(),
            command: Some("new".into()),
            endpoint: Some("localhost".into()),
            rule_id: None,
            http_status,
            error_message: error.map(String::from),
            error_details: None,
        }
    }

    #[test]
    fn test_outcome_column() {
        colored::control::set_override(false);

        assert_eq!(outcome(&entry(Some(200), None)), "HTTP 200");
        assert_eq!(outcome(&entry(None, Some("timed out"))), "timed out");
        assert_eq!(
            outcome(&entry(Some(302), Some("Not logged in"))),
            "HTTP 302 Not logged in"
        );
        assert_eq!(outcome(&entry(None, None)), "");
    }
}
