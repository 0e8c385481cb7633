//! Delete command - delete a saved rule

use anyhow::Result;
use dialoguer::Confirm;
use ruledesk_core::ports::RuleEndpoint;
use ruledesk_core::services::delete_rule_url;
use ruledesk_core::LogEvent;

use crate::output;

use super::{get_context, log_event, outcome_event};

pub fn run(id: u64, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = ctx.logger().ok();
    log_event(&logger, LogEvent::new("command_executed").with_command("delete"));

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete rule #{}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            output::note("Cancelled.");
            return Ok(());
        }
    }

    let result = ctx.endpoint.delete(&delete_rule_url(id));
    let event = LogEvent::new("rule_deleted")
        .with_command("delete")
        .with_endpoint(ctx.endpoint.name())
        .with_rule_id(id);
    log_event(&logger, outcome_event(event, "rule_delete_failed", &result));

    let response = result?;
    if json {
        println!("{}", serde_json::json!({"deleted": id, "status": response.status}));
    } else {
        output::success(&format!("Rule #{} deleted", id));
    }
    Ok(())
}
