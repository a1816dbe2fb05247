use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::domain::{Format, Payload, Table, Targets};
use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest, Query, ReqwestHttpClient};
use crate::{ApiTag, LlamaError};

/// Synchronous DefiLlama client.
///
/// Holds one reusable transport session and no per-call state; every method
/// issues its requests sequentially and returns once all of them complete.
#[derive(Clone)]
pub struct LlamaClient {
    http_client: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl Default for LlamaClient {
    fn default() -> Self {
        Self::with_config(ClientConfig::from_env())
    }
}

impl LlamaClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            http_client: Arc::new(ReqwestHttpClient::new(&config)),
            config,
        }
    }

    /// Uses `http_client` as transport, e.g. a `FixtureHttpClient` in tests.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            config: ClientConfig::default(),
        }
    }

    pub fn with_http_client_and_config(
        http_client: Arc<dyn HttpClient>,
        config: ClientConfig,
    ) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs one GET against `tag`'s host and parses the body as JSON.
    pub fn get(&self, tag: ApiTag, path: &str, query: &Query) -> Result<Value, LlamaError> {
        let url = query.append_to(&format!("{}{}", tag.base_url(), path));
        tracing::debug!(%url, "calling api endpoint");

        let request = HttpRequest::get(url.as_str())
            .with_header("Accept", "application/json")
            .with_timeout_ms(self.config.timeout_ms());
        let response = self.http_client.execute(request).map_err(|error| match error.kind() {
            HttpErrorKind::Timeout => LlamaError::Timeout { url: url.clone() },
            HttpErrorKind::Connect | HttpErrorKind::Other => LlamaError::Connection {
                url: url.clone(),
                message: error.message().to_owned(),
            },
        })?;

        if !response.is_success() {
            return Err(LlamaError::Status {
                url,
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|error| LlamaError::Decode {
            url,
            message: error.to_string(),
        })
    }

    /// [`get`](Self::get) with the API family given by name.
    ///
    /// Unknown names fail with a configuration error before any request.
    pub fn get_tagged(&self, tag: &str, path: &str, query: &Query) -> Result<Value, LlamaError> {
        let tag = tag.parse::<ApiTag>()?;
        self.get(tag, path, query)
    }

    /// Fetches `path_for(key)` for every target in order. Keys are trimmed
    /// before use, so the path, the returned key and any row tag agree.
    ///
    /// `inspect` runs on each response before it is kept, so shape checks
    /// fail fast on the first offending key.
    pub(crate) fn fetch_each<P, I>(
        &self,
        tag: ApiTag,
        targets: &Targets,
        what: &str,
        query: &Query,
        path_for: P,
        mut inspect: I,
    ) -> Result<Vec<(String, Value)>, LlamaError>
    where
        P: Fn(&str) -> String,
        I: FnMut(&str, &Value) -> Result<(), LlamaError>,
    {
        let targets = targets.normalized(what)?;

        let mut responses = Vec::with_capacity(targets.keys().len());
        for key in targets.keys() {
            let response = self.get(tag, &path_for(key), query)?;
            inspect(key, &response)?;
            responses.push((key.clone(), response));
        }
        Ok(responses)
    }
}

/// Percent-encodes a path segment (`zksync era` → `zksync%20era`).
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Raw fan-out result: unwrapped for a single target, otherwise an object
/// keyed by input in input order.
pub(crate) fn collect_raw(targets: &Targets, responses: Vec<(String, Value)>) -> Value {
    if targets.is_single() {
        return responses
            .into_iter()
            .next()
            .map_or(Value::Null, |(_, value)| value);
    }
    Value::Object(responses.into_iter().collect::<Map<String, Value>>())
}

/// Wraps a finished table, canonicalizing chain names as the last step.
pub(crate) fn finish_table(endpoint: &str, table: Table) -> Payload {
    let table = table.canonicalize_chains();
    tracing::debug!(endpoint, rows = table.len(), "normalized response");
    Payload::Table(table)
}

/// Applies `format`: raw JSON passes through, otherwise `build` produces the table.
pub(crate) fn shape<F>(endpoint: &str, format: Format, raw: Value, build: F) -> Result<Payload, LlamaError>
where
    F: FnOnce(&Value) -> Result<Table, LlamaError>,
{
    if format.is_raw() {
        return Ok(Payload::Raw(raw));
    }
    let table = build(&raw)?;
    Ok(finish_table(endpoint, table))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http_client::{FixtureHttpClient, HttpError, HttpResponse};
    use crate::ErrorKind;

    fn client_with(fixture: FixtureHttpClient) -> (LlamaClient, Arc<FixtureHttpClient>) {
        let fixture = Arc::new(fixture);
        (LlamaClient::with_http_client(fixture.clone()), fixture)
    }

    #[test]
    fn get_targets_the_host_of_each_tag() {
        let mut fixture = FixtureHttpClient::new();
        for tag in ApiTag::ALL {
            fixture = fixture.with_json(format!("{}/ping", tag.base_url()), r#"{"ok":true}"#);
        }
        let (client, fixture) = client_with(fixture);

        for tag in ApiTag::ALL {
            let value = client.get(tag, "/ping", &Query::new()).expect("fixture answers");
            assert_eq!(value, json!({"ok": true}));
        }
        assert_eq!(fixture.recorded_requests().len(), ApiTag::ALL.len());
    }

    #[test]
    fn unknown_tag_fails_before_any_request() {
        let (client, fixture) = client_with(FixtureHttpClient::new());

        let err = client
            .get_tagged("PRICES", "/ping", &Query::new())
            .expect_err("must fail");

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(fixture.recorded_requests().is_empty());
    }

    #[test]
    fn request_uses_configured_timeout_and_accepts_json() {
        let fixture = Arc::new(FixtureHttpClient::new().with_json("https://api.llama.fi/protocols", "[]"));
        let client = LlamaClient::with_http_client_and_config(
            fixture.clone(),
            ClientConfig::default().with_timeout(std::time::Duration::from_secs(5)),
        );

        client.get(ApiTag::Tvl, "/protocols", &Query::new()).expect("fixture answers");

        let request = &fixture.recorded_requests()[0];
        assert_eq!(request.timeout_ms, 5_000);
        assert_eq!(request.headers.get("accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn transport_failures_are_classified() {
        let (client, _) = client_with(
            FixtureHttpClient::new()
                .with_response("https://api.llama.fi/slow", Err(HttpError::timeout("deadline")))
                .with_response("https://api.llama.fi/down", Err(HttpError::connect("refused")))
                .with_response(
                    "https://api.llama.fi/broken",
                    Ok(HttpResponse::with_status(503, "unavailable")),
                )
                .with_json("https://api.llama.fi/html", "<html></html>"),
        );

        let timeout = client.get(ApiTag::Tvl, "/slow", &Query::new()).expect_err("timeout");
        assert_eq!(
            timeout,
            LlamaError::Timeout {
                url: String::from("https://api.llama.fi/slow")
            }
        );

        let down = client.get(ApiTag::Tvl, "/down", &Query::new()).expect_err("connect");
        assert!(matches!(down, LlamaError::Connection { .. }));

        let broken = client.get(ApiTag::Tvl, "/broken", &Query::new()).expect_err("status");
        assert!(matches!(broken, LlamaError::Status { status: 503, .. }));

        let html = client.get(ApiTag::Tvl, "/html", &Query::new()).expect_err("decode");
        assert_eq!(html.kind(), ErrorKind::Decode);
        assert_eq!(html.url(), Some("https://api.llama.fi/html"));
    }

    #[test]
    fn collect_raw_unwraps_single_and_keys_many() {
        let one = collect_raw(&Targets::from("aave"), vec![(String::from("aave"), json!(1.0))]);
        assert_eq!(one, json!(1.0));

        let many = collect_raw(
            &Targets::from(["b", "a"]),
            vec![(String::from("b"), json!(2)), (String::from("a"), json!(1))],
        );
        let keys = many.as_object().expect("object").keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(segment("zksync era"), "zksync%20era");
        assert_eq!(segment("ethereum"), "ethereum");
    }
}
