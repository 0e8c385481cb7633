//! Mock rule server for testing
//!
//! A small HTTP server that accepts the same requests as the real rule
//! views, allowing the HTTP endpoint to be tested without a running server:
//! - POST /rules/add/ and POST /rules/{id}/edit/ accept a form body
//! - POST /rules/{id}/delete/ deletes a rule
//! - GET /login/ serves the login page unauthenticated requests are sent to
//!
//! Every request is recorded so tests can inspect what was sent.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Mock rule server for testing
pub struct MockRuleServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Behaviour of the mock server
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Status returned for rule requests
    pub status: u16,
    /// Body returned for rule requests
    pub body: String,
    /// Location header sent with the rule response (for 3xx statuses)
    pub location: Option<String>,
    /// Reject requests without an X-CSRFToken header
    pub require_csrf: bool,
    /// Redirect requests without a sessionid cookie to the login page
    pub require_session: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            status: 200,
            body: r#"{"ok": true}"#.to_string(),
            location: None,
            require_csrf: false,
            require_session: false,
            delay_ms: 0,
        }
    }
}

/// A request as received by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl MockRuleServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking accept so stop() can end the loop
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let requests_clone = Arc::clone(&requests);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let requests = Arc::clone(&requests_clone);
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &requests);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockRuleServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(
    mut stream: TcpStream,
    config: &MockConfig,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_nonblocking(false);

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, None, "invalid request");
        return;
    };

    if let Ok(mut recorded) = requests.lock() {
        recorded.push(request.clone());
    }

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    if request.method == "GET" && request.path.starts_with("/login/") {
        send_response(&mut stream, 200, None, "<html>Please log in</html>");
        return;
    }

    if request.method != "POST" {
        send_response(&mut stream, 405, None, "method not allowed");
        return;
    }

    if !request.path.starts_with("/rules/") {
        send_response(&mut stream, 404, None, "not found");
        return;
    }

    let has_session = request
        .header("cookie")
        .is_some_and(|cookie| cookie.split(';').any(|c| c.trim().starts_with("sessionid=")));
    if config.require_session && !has_session {
        let login = format!("/login/?next={}", request.path);
        send_response(&mut stream, 302, Some(&login), "");
        return;
    }

    if config.require_csrf && request.header("x-csrftoken").is_none() {
        send_response(&mut stream, 403, None, "CSRF verification failed");
        return;
    }

    send_response(&mut stream, config.status, config.location.as_deref(), &config.body);
}

/// Read one request: headers, then exactly Content-Length bytes of body
fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body_end = data.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&data[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn send_response(stream: &mut TcpStream, status: u16, location: Option<&str>, body: &str) {
    let location = location
        .map(|target| format!("Location: {}\r\n", target))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} {}\r\n{}Content-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text(status),
        location,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapters::http::HttpRuleEndpoint;
    use crate::domain::{FormPayload, RuleCatalogs, RuleModel};
    use crate::ports::RuleEndpoint;
    use crate::Error;

    fn endpoint_for(server: &MockRuleServer) -> HttpRuleEndpoint {
        HttpRuleEndpoint::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_submit_sends_form_body() {
        let server = MockRuleServer::start(MockConfig::default()).unwrap();
        let endpoint = endpoint_for(&server);

        let rule = RuleModel::new(&RuleCatalogs::default());
        let response = endpoint.submit("/rules/add/", &rule.to_form()).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"ok": true}"#);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/rules/add/");
        assert_eq!(
            requests[0].header("content-type"),
            Some("application/x-www-form-urlencoded")
        );

        let received = FormPayload::decode(&requests[0].body);
        assert_eq!(received, rule.to_form());
    }

    #[test]
    fn test_server_error_is_reported() {
        let server = MockRuleServer::start(MockConfig {
            status: 500,
            body: "boom".into(),
            ..Default::default()
        })
        .unwrap();
        let endpoint = endpoint_for(&server);

        let err = endpoint.submit("/rules/add/", &FormPayload::new()).unwrap_err();
        match err {
            Error::Server { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn test_csrf_token_is_sent() {
        let server = MockRuleServer::start(MockConfig {
            require_csrf: true,
            ..Default::default()
        })
        .unwrap();

        let without = endpoint_for(&server);
        let err = without.submit("/rules/add/", &FormPayload::new()).unwrap_err();
        assert!(matches!(err, Error::Server { status: 403, .. }));

        let with = endpoint_for(&server).with_csrf_token("s3cret");
        with.submit("/rules/add/", &FormPayload::new()).unwrap();

        let last = server.requests().pop().unwrap();
        assert_eq!(last.header("x-csrftoken"), Some("s3cret"));
        assert_eq!(last.header("cookie"), Some("csrftoken=s3cret"));
    }

    #[test]
    fn test_timeout_is_transport_error() {
        let server = MockRuleServer::start(MockConfig {
            delay_ms: 1500,
            ..Default::default()
        })
        .unwrap();
        let endpoint =
            HttpRuleEndpoint::new(&server.base_url(), Duration::from_millis(200)).unwrap();

        let err = endpoint.submit("/rules/add/", &FormPayload::new()).unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
    }

    #[test]
    fn test_delete_posts_to_delete_url() {
        let server = MockRuleServer::start(MockConfig::default()).unwrap();
        let endpoint = endpoint_for(&server);

        endpoint.delete("/rules/12/delete/").unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/rules/12/delete/");
    }

    #[test]
    fn test_login_redirect_is_not_a_save() {
        let server = MockRuleServer::start(MockConfig {
            require_session: true,
            ..Default::default()
        })
        .unwrap();
        let endpoint = endpoint_for(&server);

        let err = endpoint.submit("/rules/add/", &FormPayload::new()).unwrap_err();
        match err {
            Error::Server { status, message, .. } => {
                assert_eq!(status, 302);
                assert!(message.contains("Not logged in"));
            }
            other => panic!("expected server error, got {:?}", other),
        }

        // The login page itself is never fetched
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
    }

    #[test]
    fn test_session_cookie_is_sent() {
        let server = MockRuleServer::start(MockConfig {
            require_session: true,
            require_csrf: true,
            ..Default::default()
        })
        .unwrap();
        let endpoint = endpoint_for(&server)
            .with_csrf_token("s3cret")
            .with_session_id("abc123");

        let response = endpoint.submit("/rules/add/", &FormPayload::new()).unwrap();
        assert_eq!(response.status, 200);

        let last = server.requests().pop().unwrap();
        assert_eq!(last.header("cookie"), Some("csrftoken=s3cret; sessionid=abc123"));
    }

    #[test]
    fn test_delete_redirect_to_rule_list_is_success() {
        let server = MockRuleServer::start(MockConfig {
            status: 302,
            location: Some("/rules/".into()),
            body: String::new(),
            ..Default::default()
        })
        .unwrap();
        let endpoint = endpoint_for(&server);

        let response = endpoint.delete("/rules/12/delete/").unwrap();
        assert_eq!(response.status, 302);
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let server = MockRuleServer::start(MockConfig::default()).unwrap();
        let endpoint = endpoint_for(&server);

        let err = endpoint.submit("/nowhere/", &FormPayload::new()).unwrap_err();
        assert!(matches!(err, Error::Server { status: 404, .. }));
    }
}
