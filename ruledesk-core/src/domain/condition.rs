//! Condition entry: a key/operator/value predicate row

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::{ChoiceCatalog, CONDITION_SCHEMA};

/// Comparison operator of a condition
///
/// Only equality is supported. The server stores equality as the pattern
/// `^%s$`, which is accepted when reading rule documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "=", alias = "^%s$")]
    Equals,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable condition row
#[derive(Debug, Clone)]
pub struct ConditionEntry {
    key: String,
    pub operator: Operator,
    pub value: String,
    catalog: Arc<ChoiceCatalog>,
}

impl ConditionEntry {
    /// Create a condition with the default key and an empty value
    pub fn new(catalog: Arc<ChoiceCatalog>) -> Self {
        Self {
            key: CONDITION_SCHEMA.default_key.to_string(),
            operator: Operator::default(),
            value: String::new(),
            catalog,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Change the key
    ///
    /// Unknown keys fall back to the default key. Returns `false` when the
    /// requested key was replaced by the fallback.
    pub fn set_key(&mut self, key: &str) -> bool {
        let accepted = CONDITION_SCHEMA.is_known(key, &self.catalog);
        self.key = if accepted { key } else { CONDITION_SCHEMA.default_key }.to_string();
        accepted
    }

    /// Values the catalog offers for the current key
    pub fn value_choices(&self) -> &[String] {
        self.catalog.choices(&self.key)
    }

    /// Whether the value is picked from a closed list rather than typed
    pub fn is_selectable(&self) -> bool {
        CONDITION_SCHEMA.is_selectable(&self.key)
    }

    pub fn to_record(&self) -> ConditionRecord {
        ConditionRecord {
            key: self.key.clone(),
            operator: self.operator,
            value: self.value.clone(),
        }
    }
}

/// Serialized form of a condition, as found in rule documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub key: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<ChoiceCatalog> {
        Arc::new(ChoiceCatalog::from_iter([
            ("QUEUE", vec!["support", "sales"]),
            ("STATUS", vec!["open", "closed"]),
        ]))
    }

    #[test]
    fn test_default_condition() {
        let condition = ConditionEntry::new(catalog());
        assert_eq!(condition.key(), "QUEUE");
        assert_eq!(condition.operator, Operator::Equals);
        assert_eq!(condition.value, "");
        assert_eq!(condition.value_choices(), ["support", "sales"]);
        assert!(condition.is_selectable());
    }

    #[test]
    fn test_choices_follow_key() {
        let mut condition = ConditionEntry::new(catalog());

        assert!(condition.set_key("STATUS"));
        assert_eq!(condition.value_choices(), ["open", "closed"]);

        assert!(condition.set_key("CUSTOMER"));
        assert!(condition.value_choices().is_empty());
        assert!(!condition.is_selectable());
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let mut condition = ConditionEntry::new(catalog());
        condition.set_key("STATUS");

        assert!(!condition.set_key("NOT_A_KEY"));
        assert_eq!(condition.key(), "QUEUE");
        assert_eq!(condition.value_choices(), ["support", "sales"]);
    }

    #[test]
    fn test_operator_reads_server_pattern() {
        let json = r#"{"key": "QUEUE", "operator": "^%s$", "value": "sales"}"#;
        let record: ConditionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.operator, Operator::Equals);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["operator"], "=");
    }
}
