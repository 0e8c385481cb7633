//! Choice catalogs and per-entry key tables
//!
//! A catalog maps a key (e.g. `QUEUE`) to the ordered values the server
//! accepts for it. Catalogs are supplied once, when an editor is opened, and
//! never change afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Read-only mapping from key to permissible values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceCatalog {
    choices: HashMap<String, Vec<String>>,
}

impl ChoiceCatalog {
    pub fn new(choices: HashMap<String, Vec<String>>) -> Self {
        Self { choices }
    }

    /// Values for `key`, or an empty slice when the catalog has no such key
    pub fn choices(&self, key: &str) -> &[String] {
        self.choices.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.choices.contains_key(key)
    }

    /// Catalog keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.choices.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl<K, V, I> FromIterator<(K, I)> for ChoiceCatalog
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = V>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let choices = iter
            .into_iter()
            .map(|(k, values)| (k.into(), values.into_iter().map(Into::into).collect()))
            .collect();
        Self { choices }
    }
}

/// The pair of catalogs an editor works against
///
/// File format:
/// ```json
/// {
///   "conditions": { "QUEUE": ["support", "sales"] },
///   "actions": { "ADD_TAG": ["urgent", "vip"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCatalogs {
    pub conditions: Arc<ChoiceCatalog>,
    pub actions: Arc<ChoiceCatalog>,
}

#[derive(Deserialize)]
struct CatalogsFile {
    #[serde(default)]
    conditions: ChoiceCatalog,
    #[serde(default)]
    actions: ChoiceCatalog,
}

impl RuleCatalogs {
    pub fn new(conditions: ChoiceCatalog, actions: ChoiceCatalog) -> Self {
        Self {
            conditions: Arc::new(conditions),
            actions: Arc::new(actions),
        }
    }

    /// Parse catalogs from their JSON representation
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: CatalogsFile = serde_json::from_str(json)?;
        Ok(Self::new(file.conditions, file.actions))
    }
}

/// A key with its display title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyChoice {
    pub key: &'static str,
    pub title: &'static str,
}

/// Key configuration for one entry type
///
/// Each entry type has exactly one of these tables, so the default key, the
/// presented key choices and the selectable subset can't drift apart.
#[derive(Debug)]
pub struct EntrySchema {
    pub default_key: &'static str,
    pub key_choices: &'static [KeyChoice],
    /// Keys whose values come from a closed list (the rest are free text)
    pub selectable: &'static [&'static str],
}

impl EntrySchema {
    pub fn title_for(&self, key: &str) -> Option<&'static str> {
        self.key_choices
            .iter()
            .find(|choice| choice.key == key)
            .map(|choice| choice.title)
    }

    pub fn is_selectable(&self, key: &str) -> bool {
        self.selectable.iter().any(|selectable| *selectable == key)
    }

    /// Whether `key` is usable for this entry type with the given catalog
    pub fn is_known(&self, key: &str, catalog: &ChoiceCatalog) -> bool {
        self.title_for(key).is_some() || catalog.contains_key(key)
    }
}

pub static CONDITION_SCHEMA: EntrySchema = EntrySchema {
    default_key: "QUEUE",
    key_choices: &[
        KeyChoice { key: "QUEUE", title: "Queue" },
        KeyChoice { key: "STATUS", title: "Status" },
        KeyChoice { key: "CUSTOMER", title: "Customer" },
        KeyChoice { key: "DEVICE", title: "Device" },
    ],
    selectable: &["QUEUE", "STATUS"],
};

pub static ACTION_SCHEMA: EntrySchema = EntrySchema {
    default_key: "SEND_EMAIL",
    key_choices: &[
        KeyChoice { key: "SEND_EMAIL", title: "Send Email" },
        KeyChoice { key: "SEND_SMS", title: "Send SMS" },
        KeyChoice { key: "ADD_TAG", title: "Add Tag" },
        KeyChoice { key: "SET_QUEUE", title: "Set Queue" },
        KeyChoice { key: "SET_USER", title: "Assign to" },
    ],
    selectable: &["SET_QUEUE", "SET_STATUS", "SET_USER", "ADD_TAG"],
};
