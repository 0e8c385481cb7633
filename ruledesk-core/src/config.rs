//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "server": {
//!     "baseUrl": "http://localhost:8000",
//!     "timeoutSecs": 30,
//!     "csrfToken": null,
//!     "sessionId": null
//!   },
//!   "catalogPath": "/path/to/catalogs.json"
//! }
//! ```
//! Fields this crate doesn't know about are preserved when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable that overrides the server URL for one run
pub const BASE_URL_ENV: &str = "RULEDESK_BASE_URL";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    server: ServerSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    catalog_path: Option<PathBuf>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Connection settings for the rule server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    /// Django session cookie of a logged-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            csrf_token: None,
            session_id: None,
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Ruledesk configuration
///
/// `server` holds the persisted settings. The environment override only
/// shows up through [`Config::base_url`] and is never saved.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerSettings,
    pub catalog_path: Option<PathBuf>,
    base_url_override: Option<String>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the data directory
    ///
    /// The server URL can be overridden with `RULEDESK_BASE_URL`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let base_url_override = std::env::var(BASE_URL_ENV)
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Self::load_with_override(data_dir, base_url_override)
    }

    fn load_with_override(data_dir: &Path, base_url_override: Option<String>) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            server: raw.server.clone(),
            catalog_path: raw.catalog_path.clone(),
            base_url_override,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that ruledesk doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content)
                .unwrap_or_else(|_| self._raw_settings.clone())
        } else {
            self._raw_settings.clone()
        };

        settings.server = self.server.clone();
        settings.catalog_path = self.catalog_path.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Server URL in effect for this run
    pub fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or(&self.server.base_url)
    }

    /// Whether `RULEDESK_BASE_URL` replaces the saved server URL
    pub fn base_url_overridden(&self) -> bool {
        self.base_url_override.is_some()
    }

    /// Point the saved config at a different server
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.server.base_url = base_url.into();
    }
}
