//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod catalog;
mod editor;
pub mod logging;

pub use catalog::load_catalogs;
pub use editor::{
    delete_rule_url, edit_rule_url, EditorStatus, PendingSave, RuleEditor, NEW_RULE_URL,
};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogFilter, LoggingService};
