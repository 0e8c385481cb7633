//! Action entry: a key/value effect row

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::{ChoiceCatalog, ACTION_SCHEMA};

/// One editable action row
#[derive(Debug, Clone)]
pub struct ActionEntry {
    key: String,
    /// Display title, reset to the key's title whenever the key changes
    pub title: String,
    pub value: String,
    catalog: Arc<ChoiceCatalog>,
}

impl ActionEntry {
    pub fn new(catalog: Arc<ChoiceCatalog>) -> Self {
        let key = ACTION_SCHEMA.default_key;
        Self {
            key: key.to_string(),
            title: Self::title_for(key),
            value: String::new(),
            catalog,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Change the key, falling back to the default for unknown keys
    pub fn set_key(&mut self, key: &str) -> bool {
        let accepted = ACTION_SCHEMA.is_known(key, &self.catalog);
        let key = if accepted { key } else { ACTION_SCHEMA.default_key };
        self.key = key.to_string();
        self.title = Self::title_for(key);
        accepted
    }

    pub fn value_choices(&self) -> &[String] {
        self.catalog.choices(&self.key)
    }

    pub fn is_selectable(&self) -> bool {
        ACTION_SCHEMA.is_selectable(&self.key)
    }

    pub fn to_record(&self) -> ActionRecord {
        ActionRecord {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }

    fn title_for(key: &str) -> String {
        ACTION_SCHEMA.title_for(key).unwrap_or(key).to_string()
    }
}

/// Serialized form of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub key: String,
    #[serde(default)]
    pub value: String,
}
