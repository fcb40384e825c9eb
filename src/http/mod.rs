//! The outbound HTTP seam. Adapters only ever see [`MetHttpClient`]; the
//! blocking `reqwest` implementation is [`BlockingHttpClient`].

pub mod error;

use crate::error::{GlmMetError, Result};
use crate::http::error::UpstreamError;
use bon::bon;
use log::{debug, info, warn};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_USER_AGENT: &str = concat!("glm_met/", env!("CARGO_PKG_VERSION"));
const BODY_EXCERPT_LEN: usize = 300;

/// Ordered query parameters.
///
/// Setting a key that is already present replaces its value in place, so caller
/// supplied extras layered with [`QueryParams::merge`] override what an adapter
/// put there without reordering the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn merge(&mut self, other: &QueryParams) {
        for (key, value) in &other.pairs {
            self.set(key.as_str(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// A fully shaped `GET` request against one provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MetRequest {
    url: String,
    query: QueryParams,
}

impl MetRequest {
    pub fn new(url: impl Into<String>, query: QueryParams) -> Self {
        Self {
            url: url.into(),
            query,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }
}

/// Performs a single blocking `GET` and hands back the response body.
///
/// Implementations must turn non-2xx responses into
/// [`GlmMetError::UpstreamRequestFailed`]. Retrying is up to the implementation;
/// adapters never retry.
pub trait MetHttpClient {
    /// Returns the raw response body.
    fn get_text(&self, request: &MetRequest) -> Result<String>;

    /// Returns the response body parsed as JSON.
    fn get_json(&self, request: &MetRequest) -> Result<Value> {
        let body = self.get_text(request)?;
        serde_json::from_str(&body)
            .map_err(|e| GlmMetError::upstream(request.url(), UpstreamError::Json(e)))
    }
}

/// [`MetHttpClient`] backed by `reqwest`'s blocking client.
///
/// # Examples
///
/// ```no_run
/// use glm_met::BlockingHttpClient;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), glm_met::GlmMetError> {
/// let client = BlockingHttpClient::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct BlockingHttpClient {
    client: reqwest::blocking::Client,
}

impl fmt::Debug for BlockingHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingHttpClient").finish_non_exhaustive()
    }
}

#[bon]
impl BlockingHttpClient {
    /// Builds the client.
    ///
    /// * `.timeout(Duration)`: deadline for the whole request, defaults to 60 seconds.
    /// * `.user_agent(String)`: defaults to `glm_met/<version>`.
    #[builder]
    pub fn new(timeout: Option<Duration>, user_agent: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .build()
            .map_err(GlmMetError::HttpClient)?;
        Ok(Self { client })
    }
}

impl MetHttpClient for BlockingHttpClient {
    fn get_text(&self, request: &MetRequest) -> Result<String> {
        info!("Requesting data from {}", request.url());
        debug!("Query parameters: {:?}", request.query().pairs());

        let response = self
            .client
            .get(request.url())
            .query(request.query().pairs())
            .send()
            .map_err(|e| GlmMetError::upstream(request.url(), UpstreamError::Network(e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GlmMetError::upstream(request.url(), UpstreamError::Network(e)))?;

        if !status.is_success() {
            warn!("HTTP {} from {}", status, request.url());
            return Err(GlmMetError::upstream(
                request.url(),
                error_from_status(status, &body),
            ));
        }

        debug!("Received {} bytes from {}", body.len(), request.url());
        Ok(body)
    }
}

/// Open-Meteo explains failures as `{"error": true, "reason": "..."}`; prefer
/// that reason over the raw body when it is there.
fn error_from_status(status: reqwest::StatusCode, body: &str) -> UpstreamError {
    if let Some(reason) = provider_reason(body) {
        return UpstreamError::Provider(reason);
    }
    UpstreamError::HttpStatus {
        status,
        body: body.chars().take(BODY_EXCERPT_LEN).collect(),
    }
}

pub(crate) fn provider_reason(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if value.get("error").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    Some(
        value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("unspecified error")
            .to_string(),
    )
}
