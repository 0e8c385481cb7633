//! Rule editor - the view-model behind the rule form
//!
//! Owns one [`RuleModel`] and the catalogs it was opened with. All edits go
//! through the editor so it can track whether the rule is dirty, and saving
//! serializes the structured model directly.

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{
    ActionEntry, ConditionEntry, FormPayload, MatchMode, RuleCatalogs, RuleDocument, RuleModel,
};
use crate::ports::{RuleEndpoint, SubmitResponse};

/// Form action for new rules
pub const NEW_RULE_URL: &str = "/rules/add/";

/// Form action for an existing rule
pub fn edit_rule_url(id: u64) -> String {
    format!("/rules/{}/edit/", id)
}

/// Delete action for an existing rule
pub fn delete_rule_url(id: u64) -> String {
    format!("/rules/{}/delete/", id)
}

/// Where the editor is in its save cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum EditorStatus {
    Editing,
    /// A submission is in flight; the submit control is disabled
    Saving,
    Saved,
    /// Last submission failed; the rule is still editable
    Failed(String),
}

/// A submission handed out by [`RuleEditor::begin_save`]
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub action_url: String,
    pub form: FormPayload,
}

/// View-model for editing one rule
pub struct RuleEditor {
    catalogs: RuleCatalogs,
    rule: RuleModel,
    action_url: String,
    status: EditorStatus,
    dirty: bool,
}

impl RuleEditor {
    /// Open the editor on a fresh default rule
    pub fn new(catalogs: RuleCatalogs, action_url: impl Into<String>) -> Self {
        let rule = RuleModel::new(&catalogs);
        Self {
            catalogs,
            rule,
            action_url: action_url.into(),
            status: EditorStatus::Editing,
            dirty: false,
        }
    }

    /// Open the editor on a rule the server already has
    pub fn with_document(
        catalogs: RuleCatalogs,
        action_url: impl Into<String>,
        document: &RuleDocument,
    ) -> Self {
        let rule = RuleModel::from_document(document, &catalogs);
        Self {
            catalogs,
            rule,
            action_url: action_url.into(),
            status: EditorStatus::Editing,
            dirty: false,
        }
    }

    pub fn rule(&self) -> &RuleModel {
        &self.rule
    }

    pub fn catalogs(&self) -> &RuleCatalogs {
        &self.catalogs
    }

    pub fn action_url(&self) -> &str {
        &self.action_url
    }

    pub fn status(&self) -> &EditorStatus {
        &self.status
    }

    /// Message to show inline after a failed save
    pub fn last_error(&self) -> Option<&str> {
        match &self.status {
            EditorStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.status != EditorStatus::Saving
    }

    // === Rows ===

    pub fn add_condition(&mut self) -> &ConditionEntry {
        self.dirty = true;
        self.rule.add_condition(&self.catalogs.conditions)
    }

    pub fn remove_condition(&mut self, index: usize) -> bool {
        let removed = self.rule.remove_condition(index);
        self.dirty |= removed;
        removed
    }

    pub fn add_action(&mut self) -> &ActionEntry {
        self.dirty = true;
        self.rule.add_action(&self.catalogs.actions)
    }

    pub fn remove_action(&mut self, index: usize) -> bool {
        let removed = self.rule.remove_action(index);
        self.dirty |= removed;
        removed
    }

    // === Field bindings ===

    pub fn set_match(&mut self, match_mode: MatchMode) {
        self.rule.match_mode = match_mode;
        self.dirty = true;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.rule.description = description.into();
        self.dirty = true;
    }

    /// Change a condition's key; returns whether the key was accepted as is
    pub fn set_condition_key(&mut self, index: usize, key: &str) -> Result<bool> {
        let accepted = self.condition_mut(index)?.set_key(key);
        self.dirty = true;
        Ok(accepted)
    }

    pub fn set_condition_value(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.condition_mut(index)?.value = value.into();
        self.dirty = true;
        Ok(())
    }

    pub fn set_action_key(&mut self, index: usize, key: &str) -> Result<bool> {
        let accepted = self.action_mut(index)?.set_key(key);
        self.dirty = true;
        Ok(accepted)
    }

    pub fn set_action_title(&mut self, index: usize, title: impl Into<String>) -> Result<()> {
        self.action_mut(index)?.title = title.into();
        self.dirty = true;
        Ok(())
    }

    pub fn set_action_value(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.action_mut(index)?.value = value.into();
        self.dirty = true;
        Ok(())
    }

    fn condition_mut(&mut self, index: usize) -> Result<&mut ConditionEntry> {
        self.rule
            .condition_mut(index)
            .ok_or_else(|| Error::not_found(format!("condition #{}", index + 1)))
    }

    fn action_mut(&mut self, index: usize) -> Result<&mut ActionEntry> {
        self.rule
            .action_mut(index)
            .ok_or_else(|| Error::not_found(format!("action #{}", index + 1)))
    }

    // === Saving ===

    /// Start a save: snapshot the form and disable submission
    ///
    /// Fails with [`Error::SaveInFlight`] while another save is pending.
    pub fn begin_save(&mut self) -> Result<PendingSave> {
        if self.status == EditorStatus::Saving {
            return Err(Error::SaveInFlight);
        }
        self.status = EditorStatus::Saving;
        Ok(PendingSave {
            action_url: self.action_url.clone(),
            form: self.rule.to_form(),
        })
    }

    /// Record the outcome of the pending save and re-enable submission
    pub fn finish_save(&mut self, outcome: Result<SubmitResponse>) -> Result<SubmitResponse> {
        match outcome {
            Ok(response) => {
                self.status = EditorStatus::Saved;
                self.dirty = false;
                Ok(response)
            }
            Err(e) => {
                self.status = EditorStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Submit the rule through `endpoint`
    pub fn save(&mut self, endpoint: &dyn RuleEndpoint) -> Result<SubmitResponse> {
        let pending = self.begin_save()?;
        let outcome = endpoint.submit(&pending.action_url, &pending.form);
        self.finish_save(outcome)
    }

    /// Discard the rule and start over with a default one
    pub fn reset(&mut self, catalogs: RuleCatalogs) -> Result<()> {
        if self.status == EditorStatus::Saving {
            return Err(Error::SaveInFlight);
        }
        self.rule = RuleModel::new(&catalogs);
        self.catalogs = catalogs;
        self.status = EditorStatus::Editing;
        self.dirty = false;
        Ok(())
    }
}
