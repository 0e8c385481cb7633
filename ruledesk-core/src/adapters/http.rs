//! HTTP rule endpoint
//!
//! Posts rule forms to the server's rule views over HTTP.
//!
//! Redirects are not followed. The rule views answer a successful delete
//! with a redirect to the rule list, while an expired or missing session
//! is redirected to the login page and must not count as a save.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION};
use reqwest::redirect::Policy;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::FormPayload;
use crate::ports::{RuleEndpoint, SubmitResponse};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Path the server redirects unauthenticated requests to
pub const LOGIN_PATH: &str = "/login/";

const LOGIN_REQUIRED: &str =
    "Not logged in: the server redirected to its login page. Check the session id";

/// Rule endpoint backed by a blocking reqwest client
#[derive(Debug)]
pub struct HttpRuleEndpoint {
    client: Client,
    base_url: Url,
    timeout: Duration,
    csrf_token: Option<String>,
    session_id: Option<String>,
}

impl HttpRuleEndpoint {
    /// Create an endpoint for the server at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid server URL '{}': {}", base_url, e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::config("Server URL must use http or https"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
            csrf_token: None,
            session_id: None,
        })
    }

    /// Send a CSRF token with every request (header and cookie)
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Send a session cookie so the server sees a logged-in user
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an action URL against the server base URL
    ///
    /// Absolute URLs are returned unchanged.
    pub fn resolve(&self, action_url: &str) -> Result<Url> {
        self.base_url
            .join(action_url)
            .map_err(|e| Error::validation(format!("Invalid action URL '{}': {}", action_url, e)))
    }

    fn post(&self, url: Url) -> RequestBuilder {
        let mut request = self.client.post(url);
        let mut cookies = Vec::new();
        if let Some(token) = &self.csrf_token {
            request = request.header("X-CSRFToken", token);
            cookies.push(format!("csrftoken={}", token));
        }
        if let Some(session_id) = &self.session_id {
            cookies.push(format!("sessionid={}", session_id));
        }
        if !cookies.is_empty() {
            request = request.header(COOKIE, cookies.join("; "));
        }
        request
    }

    fn send(&self, url: Url, request: RequestBuilder) -> Result<SubmitResponse> {
        let response = request.send().map_err(|e| self.map_request_error(e))?;
        let status = response.status().as_u16();
        let redirected_to_login = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|location| is_login_location(&url, location));
        let body = response.text().map_err(|e| self.map_request_error(e))?;

        if redirected_to_login {
            return Err(Error::Server {
                status,
                message: LOGIN_REQUIRED.to_string(),
                body,
            });
        }
        check_response_status(status, body)
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!(
                "Request timed out after {} seconds",
                self.timeout.as_secs_f32()
            ))
        } else if error.is_connect() {
            Error::transport(format!(
                "Unable to connect to {}",
                self.base_url.host_str().unwrap_or("server")
            ))
        } else {
            Error::transport(format!("Request failed: {}", error))
        }
    }
}

/// Whether a redirect target is the login page
fn is_login_location(request_url: &Url, location: &str) -> bool {
    request_url
        .join(location)
        .map(|target| target.path().starts_with(LOGIN_PATH))
        .unwrap_or(false)
}

/// Turn a status and body into a response or a server error
///
/// Redirects other than to the login page are how the rule views
/// acknowledge a change, so they count as success.
fn check_response_status(status: u16, body: String) -> Result<SubmitResponse> {
    let message = match status {
        200..=399 => return Ok(SubmitResponse { status, body }),
        403 => "Permission denied. Check your session and CSRF token",
        404 => "Rule not found",
        500..=599 => "The server failed to process the rule",
        _ => "Unexpected response from server",
    };

    Err(Error::Server {
        status,
        message: message.to_string(),
        body,
    })
}

impl RuleEndpoint for HttpRuleEndpoint {
    fn name(&self) -> &str {
        self.base_url.host_str().unwrap_or("server")
    }

    fn submit(&self, action_url: &str, form: &FormPayload) -> Result<SubmitResponse> {
        let url = self.resolve(action_url)?;
        let request = self
            .post(url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form.encode());
        self.send(url, request)
    }

    fn delete(&self, delete_url: &str) -> Result<SubmitResponse> {
        let url = self.resolve(delete_url)?;
        self.send(url.clone(), self.post(url))
    }
}
