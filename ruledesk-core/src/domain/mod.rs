//! Core domain entities
//!
//! Pure data structures for rule editing - no I/O or external dependencies.

mod action;
pub mod catalog;
mod condition;
mod form;
pub mod result;
mod rule;

pub use action::{ActionEntry, ActionRecord};
pub use catalog::{
    ChoiceCatalog, EntrySchema, KeyChoice, RuleCatalogs, ACTION_SCHEMA, CONDITION_SCHEMA,
};
pub use condition::{ConditionEntry, ConditionRecord, Operator};
pub use form::FormPayload;
pub use rule::{MatchMode, RuleDocument, RuleModel, DEFAULT_DESCRIPTION};
