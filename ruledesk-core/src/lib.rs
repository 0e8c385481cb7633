//! Ruledesk Core - rule editing logic
//!
//! This crate implements the rule editor following hexagonal architecture:
//!
//! - **domain**: Catalogs, condition/action entries, the rule model and its wire format
//! - **ports**: Trait definitions for external dependencies (RuleEndpoint)
//! - **services**: The rule editor, catalog loading, event logging
//! - **adapters**: Concrete implementations (HTTP endpoint)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
mod log_migrations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::http::HttpRuleEndpoint;
use config::Config;
use services::{edit_rule_url, load_catalogs, RuleEditor, NEW_RULE_URL};

// Re-export commonly used types at crate root
pub use domain::{
    ActionEntry, ChoiceCatalog, ConditionEntry, FormPayload, MatchMode, RuleCatalogs, RuleDocument,
    RuleModel,
};
pub use domain::result::{Error, OperationResult};
pub use services::{EditorStatus, EntryPoint, LogEntry, LogEvent, LogFilter, LoggingService};

/// Main context for Ruledesk operations
///
/// Holds the configuration and the endpoint rules are submitted to, and
/// opens editors against them.
pub struct RuledeskContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub endpoint: Arc<HttpRuleEndpoint>,
    entry_point: EntryPoint,
}

impl RuledeskContext {
    /// Create a new context from the data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let mut endpoint = HttpRuleEndpoint::new(config.base_url(), config.server.timeout())
            .context("Failed to configure rule server endpoint")?;
        if let Some(token) = &config.server.csrf_token {
            endpoint = endpoint.with_csrf_token(token.clone());
        }
        if let Some(session_id) = &config.server.session_id {
            endpoint = endpoint.with_session_id(session_id.clone());
        }

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            endpoint: Arc::new(endpoint),
            entry_point: EntryPoint::Library,
        })
    }

    /// Record log events under a different entry point
    ///
    /// Contexts log as [`EntryPoint::Library`] unless the host says otherwise.
    pub fn with_entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_point = entry_point;
        self
    }

    /// Open the event log in the data directory
    pub fn logger(&self) -> Result<LoggingService> {
        LoggingService::new(&self.data_dir, self.entry_point, env!("CARGO_PKG_VERSION"))
    }

    /// Load catalogs from `path`, or from the configured catalog path
    ///
    /// With neither available the catalogs are empty, so every entry offers
    /// free-text values.
    pub fn catalogs(&self, path: Option<&Path>) -> Result<RuleCatalogs> {
        match path.or(self.config.catalog_path.as_deref()) {
            Some(path) => load_catalogs(path),
            None => Ok(RuleCatalogs::default()),
        }
    }

    /// Open an editor on a new rule
    pub fn new_rule_editor(&self, catalogs: RuleCatalogs) -> RuleEditor {
        RuleEditor::new(catalogs, NEW_RULE_URL)
    }

    /// Open an editor on an existing rule
    pub fn edit_rule_editor(
        &self,
        catalogs: RuleCatalogs,
        id: u64,
        document: &RuleDocument,
    ) -> RuleEditor {
        let mut document = document.clone();
        document.id = Some(id);
        RuleEditor::with_document(catalogs, edit_rule_url(id), &document)
    }
}
