//! Catalog loading
//!
//! Catalogs are exported by the server (the same data it embeds in the rule
//! form page) and read from a JSON file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::RuleCatalogs;

/// Read condition and action catalogs from a JSON file
pub fn load_catalogs(path: &Path) -> Result<RuleCatalogs> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    RuleCatalogs::from_json(&content)
        .with_context(|| format!("Invalid catalog file {}", path.display()))
}
