//! Server command - show or change the rule server settings

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use ruledesk_core::adapters::http::HttpRuleEndpoint;
use ruledesk_core::config::{Config, BASE_URL_ENV};
use ruledesk_core::LogEvent;

use crate::output;

use super::{get_data_dir, get_logger, log_event};

#[derive(Args)]
pub struct ServerArgs {
    /// Base URL rules are submitted to
    #[arg(long)]
    pub url: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// CSRF token sent with every request
    #[arg(long, conflicts_with = "clear_csrf_token")]
    pub csrf_token: Option<String>,
    /// Forget the stored CSRF token
    #[arg(long)]
    pub clear_csrf_token: bool,
    /// Session cookie of a logged-in user
    #[arg(long, conflicts_with = "clear_session_id")]
    pub session_id: Option<String>,
    /// Forget the stored session cookie
    #[arg(long)]
    pub clear_session_id: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ServerArgs {
    fn changes_settings(&self) -> bool {
        self.url.is_some()
            || self.timeout.is_some()
            || self.csrf_token.is_some()
            || self.clear_csrf_token
            || self.session_id.is_some()
            || self.clear_session_id
    }
}

/// Apply the requested changes to the saved settings
fn apply(args: ServerArgs, config: &mut Config) -> Result<()> {
    if let Some(url) = args.url {
        // Reject URLs the endpoint would refuse later
        HttpRuleEndpoint::new(&url, config.server.timeout())?;
        config.set_base_url(url);
    }
    if let Some(secs) = args.timeout {
        if secs == 0 {
            anyhow::bail!("Timeout must be at least one second");
        }
        config.server.timeout_secs = secs;
    }
    if args.clear_csrf_token {
        config.server.csrf_token = None;
    } else if let Some(token) = args.csrf_token {
        config.server.csrf_token = Some(token);
    }
    if args.clear_session_id {
        config.server.session_id = None;
    } else if let Some(session_id) = args.session_id {
        config.server.session_id = Some(session_id);
    }
    Ok(())
}

pub fn run(args: ServerArgs) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
    let mut config = Config::load(&data_dir)?;

    let json = args.json;
    let changing = args.changes_settings();
    if changing {
        log_event(&get_logger(), LogEvent::new("command_executed").with_command("server"));
        apply(args, &mut config)?;
        config.save(&data_dir)?;
    }

    if json {
        let value = serde_json::json!({
            "baseUrl": config.base_url(),
            "savedBaseUrl": config.server.base_url,
            "timeoutSecs": config.server.timeout_secs,
            "csrfToken": output::secret_state(config.server.csrf_token.as_deref()),
            "sessionId": output::secret_state(config.server.session_id.as_deref()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if changing {
        output::success("Server settings saved");
    }
    println!("{}", "Rule Server".bold());
    println!("  Base URL:   {}", config.base_url());
    if config.base_url_overridden() {
        println!(
            "  {}",
            format!("(from {}, saved: {})", BASE_URL_ENV, config.server.base_url).dimmed()
        );
    }
    println!("  Timeout:    {}s", config.server.timeout_secs);
    println!("  CSRF token: {}", output::secret_state(config.server.csrf_token.as_deref()));
    println!("  Session:    {}", output::secret_state(config.server.session_id.as_deref()));
    if let Some(path) = &config.catalog_path {
        println!("  Catalog:    {}", path.display());
    }
    Ok(())
}
