use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::config::{ClientConfig, DEFAULT_TIMEOUT};

/// Ordered query parameters, percent-encoded when appended to a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    pub fn push_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the encoded query to `url`, leaving it untouched when empty.
    pub fn append_to(&self, url: &str) -> String {
        if self.is_empty() {
            url.to_owned()
        } else {
            format!("{url}?{}", self.encode())
        }
    }
}

/// GET request handed to an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// URL without its query string.
    pub fn path_url(&self) -> &str {
        self.url
            .split_once('?')
            .map_or(self.url.as_str(), |(base, _)| base)
    }
}

/// Raw HTTP response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: HttpErrorKind,
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: HttpErrorKind::Other,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: HttpErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            kind: HttpErrorKind::Connect,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Blocking transport contract; one call performs exactly one request.
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Production transport backed by a reusable `reqwest` blocking session.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .user_agent(config.user_agent.as_str())
                .cookie_store(true)
                .build()
                .unwrap_or_else(|_| reqwest::blocking::Client::new()),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .client
            .get(&request.url)
            .timeout(Duration::from_millis(request.timeout_ms));

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().map_err(classify_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::timeout(format!("request timeout: {error}"))
    } else if error.is_connect() {
        HttpError::connect(format!("connection failed: {error}"))
    } else {
        HttpError::new(format!("request failed: {error}"))
    }
}

/// Offline transport serving canned responses keyed by URL (query excluded).
///
/// Unknown URLs answer with HTTP 404. Every request is recorded so callers
/// can assert on the exact URLs a method produced.
#[derive(Debug, Default)]
pub struct FixtureHttpClient {
    routes: BTreeMap<String, Result<HttpResponse, HttpError>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FixtureHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(url, Ok(HttpResponse::ok_json(body)))
    }

    pub fn with_response(
        mut self,
        url: impl Into<String>,
        response: Result<HttpResponse, HttpError>,
    ) -> Self {
        self.routes.insert(url.into(), response);
        self
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn recorded_urls(&self) -> Vec<String> {
        self.recorded_requests()
            .into_iter()
            .map(|request| request.url)
            .collect()
    }
}

impl HttpClient for FixtureHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self
            .routes
            .get(request.path_url())
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "not found")));

        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        response
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn query_is_percent_encoded_in_insertion_order() {
        let query = Query::new()
            .with("dataType", "dailyVolume")
            .with("address", "ethereum:0xab cd");

        assert_eq!(
            query.append_to("https://api.llama.fi/overview/dexs"),
            "https://api.llama.fi/overview/dexs?dataType=dailyVolume&address=ethereum%3A0xab%20cd"
        );
        assert_eq!(Query::new().append_to("https://x.test/a"), "https://x.test/a");
    }

    #[test]
    fn fixture_routes_ignore_query_and_record_requests() {
        let client = FixtureHttpClient::new().with_json("https://api.llama.fi/protocols", "[]");

        let hit = client
            .execute(HttpRequest::get("https://api.llama.fi/protocols?x=1"))
            .expect("fixture should answer");
        let miss = client
            .execute(HttpRequest::get("https://api.llama.fi/unknown"))
            .expect("fixture should answer");

        assert_eq!(hit.body, "[]");
        assert_eq!(miss.status, 404);
        assert_eq!(
            client.recorded_urls(),
            vec![
                String::from("https://api.llama.fi/protocols?x=1"),
                String::from("https://api.llama.fi/unknown"),
            ]
        );
    }

    #[test]
    fn reqwest_client_reports_timeout_when_server_never_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let url = format!("http://{}/protocols", listener.local_addr().expect("addr"));

        let error = ReqwestHttpClient::default()
            .execute(HttpRequest::get(url).with_timeout_ms(200))
            .expect_err("silent server must time out");

        assert_eq!(error.kind(), HttpErrorKind::Timeout);
        drop(listener);
    }

    #[test]
    fn reqwest_client_reports_connect_failure_for_closed_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
            listener.local_addr().expect("addr").port()
        };

        let error = ReqwestHttpClient::default()
            .execute(HttpRequest::get(format!("http://127.0.0.1:{port}/protocols")).with_timeout_ms(2_000))
            .expect_err("closed port must refuse");

        assert_eq!(error.kind(), HttpErrorKind::Connect);
    }
}
