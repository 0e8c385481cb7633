//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the RuleEndpoint port
//! - an in-process mock rule server for tests

pub mod http;

#[cfg(test)]
pub mod mock_server;
