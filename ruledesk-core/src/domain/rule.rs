//! Rule domain model
//!
//! A rule pairs a match mode with ordered condition and action lists. Both
//! lists always hold at least one entry so there is always a row to edit.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::action::{ActionEntry, ActionRecord};
use super::catalog::{ChoiceCatalog, RuleCatalogs};
use super::condition::{ConditionEntry, ConditionRecord};
use super::form::FormPayload;
use super::result::Error;

pub const DEFAULT_DESCRIPTION: &str = "New Rule";

/// How conditions combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchMode {
    /// At least one condition must hold
    #[default]
    Any,
    /// Every condition must hold
    All,
}

impl MatchMode {
    pub const ALL_MODES: [MatchMode; 2] = [MatchMode::Any, MatchMode::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Any => "ANY",
            MatchMode::All => "ALL",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MatchMode::Any => "Any",
            MatchMode::All => "All",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ANY" => Ok(MatchMode::Any),
            "ALL" => Ok(MatchMode::All),
            other => Err(Error::validation(format!(
                "Unknown match mode '{}' (expected ANY or ALL)",
                other
            ))),
        }
    }
}

/// A rule as the server serializes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

/// In-memory rule being edited
#[derive(Debug, Clone)]
pub struct RuleModel {
    pub id: Option<u64>,
    pub match_mode: MatchMode,
    pub description: String,
    conditions: Vec<ConditionEntry>,
    actions: Vec<ActionEntry>,
}

impl RuleModel {
    /// Create a rule with one default condition and one default action
    pub fn new(catalogs: &RuleCatalogs) -> Self {
        Self {
            id: None,
            match_mode: MatchMode::default(),
            description: default_description(),
            conditions: vec![ConditionEntry::new(Arc::clone(&catalogs.conditions))],
            actions: vec![ActionEntry::new(Arc::clone(&catalogs.actions))],
        }
    }

    /// Build a rule from a server document
    ///
    /// Keys go through the same fallback as interactive edits. Empty lists
    /// are padded with a default entry.
    pub fn from_document(document: &RuleDocument, catalogs: &RuleCatalogs) -> Self {
        let mut conditions: Vec<ConditionEntry> = document
            .conditions
            .iter()
            .map(|record| {
                let mut entry = ConditionEntry::new(Arc::clone(&catalogs.conditions));
                entry.set_key(&record.key);
                entry.operator = record.operator;
                entry.value = record.value.clone();
                entry
            })
            .collect();
        if conditions.is_empty() {
            conditions.push(ConditionEntry::new(Arc::clone(&catalogs.conditions)));
        }

        let mut actions: Vec<ActionEntry> = document
            .actions
            .iter()
            .map(|record| {
                let mut entry = ActionEntry::new(Arc::clone(&catalogs.actions));
                entry.set_key(&record.key);
                entry.value = record.value.clone();
                entry
            })
            .collect();
        if actions.is_empty() {
            actions.push(ActionEntry::new(Arc::clone(&catalogs.actions)));
        }

        Self {
            id: document.id,
            match_mode: document.match_mode,
            description: document.description.clone(),
            conditions,
            actions,
        }
    }

    pub fn conditions(&self) -> &[ConditionEntry] {
        &self.conditions
    }

    pub fn actions(&self) -> &[ActionEntry] {
        &self.actions
    }

    pub fn condition_mut(&mut self, index: usize) -> Option<&mut ConditionEntry> {
        self.conditions.get_mut(index)
    }

    pub fn action_mut(&mut self, index: usize) -> Option<&mut ActionEntry> {
        self.actions.get_mut(index)
    }

    /// Append a default condition
    pub fn add_condition(&mut self, catalog: &Arc<ChoiceCatalog>) -> &mut ConditionEntry {
        self.conditions.push(ConditionEntry::new(Arc::clone(catalog)));
        let last = self.conditions.len() - 1;
        &mut self.conditions[last]
    }

    /// Append a default action
    pub fn add_action(&mut self, catalog: &Arc<ChoiceCatalog>) -> &mut ActionEntry {
        self.actions.push(ActionEntry::new(Arc::clone(catalog)));
        let last = self.actions.len() - 1;
        &mut self.actions[last]
    }

    /// Remove the condition at `index`
    ///
    /// The last remaining condition is never removed. Returns whether an
    /// entry was removed.
    pub fn remove_condition(&mut self, index: usize) -> bool {
        remove_keeping_one(&mut self.conditions, index)
    }

    /// Remove the action at `index`, keeping at least one action
    pub fn remove_action(&mut self, index: usize) -> bool {
        remove_keeping_one(&mut self.actions, index)
    }

    pub fn to_document(&self) -> RuleDocument {
        RuleDocument {
            id: self.id,
            description: self.description.clone(),
            match_mode: self.match_mode,
            conditions: self.conditions.iter().map(ConditionEntry::to_record).collect(),
            actions: self.actions.iter().map(ActionEntry::to_record).collect(),
        }
    }

    /// Serialize into the form body the save endpoint expects
    pub fn to_form(&self) -> FormPayload {
        let mut form = FormPayload::new();
        form.push("description", &self.description);
        form.push("match", self.match_mode.as_str());

        for condition in &self.conditions {
            form.push("condition-key", condition.key());
            form.push("condition-operator", condition.operator.as_str());
            form.push("condition-value", &condition.value);
        }

        for action in &self.actions {
            form.push("action-key", action.key());
            form.push("action-value", &action.value);
        }

        form
    }
}

fn remove_keeping_one<T>(entries: &mut Vec<T>, index: usize) -> bool {
    if entries.len() < 2 || index >= entries.len() {
        return false;
    }
    entries.remove(index);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogs() -> RuleCatalogs {
        RuleCatalogs::new(
            ChoiceCatalog::from_iter([
                ("QUEUE", vec!["support", "sales"]),
                ("STATUS", vec!["open", "closed"]),
            ]),
            ChoiceCatalog::from_iter([("SEND_EMAIL", vec![]), ("ADD_TAG", vec!["urgent", "vip"])]),
        )
    }

    #[test]
    fn test_new_rule_defaults() {
        let rule = RuleModel::new(&catalogs());
        assert_eq!(rule.id, None);
        assert_eq!(rule.match_mode, MatchMode::Any);
        assert_eq!(rule.description, "New Rule");
        assert_eq!(rule.conditions().len(), 1);
        assert_eq!(rule.actions().len(), 1);
        assert_eq!(rule.conditions()[0].key(), "QUEUE");
        assert_eq!(rule.actions()[0].key(), "SEND_EMAIL");
    }

    #[test]
    fn test_removal_never_empties_lists() {
        let mut rule = RuleModel::new(&catalogs());

        for _ in 0..5 {
            assert!(!rule.remove_condition(0));
            assert!(!rule.remove_action(0));
        }
        assert_eq!(rule.conditions().len(), 1);
        assert_eq!(rule.actions().len(), 1);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let catalogs = catalogs();
        let mut rule = RuleModel::new(&catalogs);
        rule.add_condition(&catalogs.conditions);

        assert!(!rule.remove_condition(7));
        assert_eq!(rule.conditions().len(), 2);
    }

    #[test]
    fn test_removal_preserves_order() {
        let catalogs = catalogs();
        let mut rule = RuleModel::new(&catalogs);
        rule.condition_mut(0).unwrap().value = "original".into();
        for i in 1..=4 {
            rule.add_condition(&catalogs.conditions).value = format!("added-{}", i);
        }

        assert!(rule.remove_condition(2));
        let values: Vec<&str> = rule.conditions().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["original", "added-1", "added-3", "added-4"]);
    }

    #[test]
    fn test_match_mode_parsing() {
        assert_eq!("any".parse::<MatchMode>().unwrap(), MatchMode::Any);
        assert_eq!(" ALL ".parse::<MatchMode>().unwrap(), MatchMode::All);
        assert!("some".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::All.title(), "All");
    }

    #[test]
    fn test_from_server_document() {
        let json = r#"{
            "description": "Escalate VIPs",
            "match": "ALL",
            "conditions": [
                {"key": "QUEUE", "operator": "^%s$", "value": "support"},
                {"key": "CUSTOMER_NAME", "operator": "^%s$", "value": "ACME"}
            ],
            "actions": [{"key": "ADD_TAG", "value": "vip"}]
        }"#;
        let document: RuleDocument = serde_json::from_str(json).unwrap();
        let rule = RuleModel::from_document(&document, &catalogs());

        assert_eq!(rule.description, "Escalate VIPs");
        assert_eq!(rule.match_mode, MatchMode::All);
        assert_eq!(rule.conditions().len(), 2);
        assert_eq!(rule.conditions()[0].value, "support");
        // CUSTOMER_NAME is unknown on this side and falls back
        assert_eq!(rule.conditions()[1].key(), "QUEUE");
        assert_eq!(rule.conditions()[1].value, "ACME");
        assert_eq!(rule.actions()[0].key(), "ADD_TAG");
        assert_eq!(rule.actions()[0].title, "Add Tag");
    }

    #[test]
    fn test_document_with_empty_lists_is_padded() {
        let document: RuleDocument = serde_json::from_str(r#"{"id": 12}"#).unwrap();
        let rule = RuleModel::from_document(&document, &catalogs());

        assert_eq!(rule.id, Some(12));
        assert_eq!(rule.description, "New Rule");
        assert_eq!(rule.conditions().len(), 1);
        assert_eq!(rule.actions().len(), 1);
    }

    #[test]
    fn test_document_round_trip_keeps_entries() {
        let catalogs = catalogs();
        let mut rule = RuleModel::new(&catalogs);
        rule.match_mode = MatchMode::All;
        rule.add_action(&catalogs.actions).set_key("ADD_TAG");

        let document = rule.to_document();
        assert_eq!(document.actions.len(), 2);
        assert_eq!(document.actions[1].key, "ADD_TAG");

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["match"], "ALL");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_to_form_field_order() {
        let catalogs = catalogs();
        let mut rule = RuleModel::new(&catalogs);
        rule.description = "Route sales".into();
        rule.condition_mut(0).unwrap().value = "sales".into();
        let action = rule.add_action(&catalogs.actions);
        action.set_key("ADD_TAG");
        action.value = "vip".into();

        let form = rule.to_form();
        let names: Vec<&str> = form.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "description",
                "match",
                "condition-key",
                "condition-operator",
                "condition-value",
                "action-key",
                "action-value",
                "action-key",
                "action-value",
            ]
        );
        assert_eq!(rule.to_form().values("action-value"), vec!["", "vip"]);
    }
}
