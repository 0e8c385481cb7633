//! Rule endpoint port
//!
//! Defines the interface for handing a rule to the server. The server owns
//! persistence and validation; the editor only needs to know whether the
//! submission went through.

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::FormPayload;

/// Response to a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitResponse {
    /// HTTP status (always 2xx here; failures are errors)
    pub status: u16,
    /// Raw body, kept for diagnostics only
    pub body: String,
}

/// Rule endpoint trait
///
/// Implementations deliver form bodies to URLs declared by the server
/// (e.g. `/rules/add/`, `/rules/12/edit/`). Relative URLs are resolved by the
/// implementation.
pub trait RuleEndpoint: Send + Sync {
    /// Endpoint name for logging (e.g. the server host)
    fn name(&self) -> &str;

    /// POST a rule form to `action_url`
    ///
    /// Non-success responses are returned as [`crate::Error::Server`],
    /// failures to get any response as [`crate::Error::Transport`].
    fn submit(&self, action_url: &str, form: &FormPayload) -> Result<SubmitResponse>;

    /// POST a delete request for a saved rule
    fn delete(&self, delete_url: &str) -> Result<SubmitResponse>;
}
