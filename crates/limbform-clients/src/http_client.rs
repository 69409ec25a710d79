//! Shared HTTP client for the remote services
//!
//! One `reqwest::Client` per service client, configured from `[http]`. There
//! are no automatic retries: every retry is a user action.

use limbform_config::Config;
use limbform_utils::error::ClientError;
use limbform_utils::redaction::{redact_credentials, redact_error_message};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Longest error body excerpt carried into a message
const MAX_DETAIL_CHARS: usize = 500;

/// Status and full body text of a completed request.
///
/// The body is read as text first because some services answer with
/// non-JSON challenges.
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Build a client with the given connect timeout and optional
    /// whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if the client cannot be constructed
    pub fn new(connect_timeout: Duration, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ClientError::Misconfiguration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Build a client from the `[http]` section
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(
            Duration::from_secs(config.connect_timeout_secs()),
            config.http.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn post(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.client.post(url)
    }

    pub fn head(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.client.head(url)
    }

    /// Send a request once and read the whole body as text.
    ///
    /// Status codes are not interpreted here; each service decides what a
    /// non-2xx reply means.
    ///
    /// # Errors
    ///
    /// - `ClientError::Timeout` when the configured timeout elapses
    /// - `ClientError::Transport` for connection and body-read failures
    pub async fn send(
        &self,
        request: RequestBuilder,
        service: &str,
    ) -> Result<HttpReply, ClientError> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        debug!(
            service = service,
            timeout_secs = self.timeout.map(|t| t.as_secs()),
            "Executing HTTP request"
        );

        let response = request.send().await.map_err(|e| self.transport_error(e, service))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, service))?;

        debug!(
            service = service,
            status = status.as_u16(),
            body_len = body.len(),
            "Received HTTP response"
        );

        Ok(HttpReply { status, body })
    }

    fn transport_error(&self, e: reqwest::Error, service: &str) -> ClientError {
        if e.is_timeout()
            && let Some(duration) = self.timeout
        {
            return ClientError::Timeout { duration };
        }
        ClientError::Transport(format!(
            "{service} request failed: {}",
            redact_error_message(&e.to_string())
        ))
    }
}

/// Map a non-success status to a `ClientError`
///
/// - 400 → `BadRequest` carrying the body's error detail
/// - 401/403 → `ProviderAuth`
/// - 429 → `ProviderQuota`
/// - 5xx → `ProviderOutage`
/// - other 4xx → `Transport`
pub(crate) fn map_status_error(status: StatusCode, service: &str, body: &str) -> ClientError {
    match status {
        StatusCode::BAD_REQUEST => ClientError::BadRequest(extract_error_detail(body)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::ProviderAuth(format!("{service} authentication failed: {status}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            ClientError::ProviderQuota(format!("{service} rate limit exceeded: {status}"))
        }
        s if s.is_server_error() => {
            ClientError::ProviderOutage(format!("{service} returned server error: {status}"))
        }
        _ => ClientError::Transport(format!("{service} returned client error: {status}")),
    }
}

/// Most actionable message in an error body.
///
/// Tries JSON `error` (string or `{ message }`) and `message` fields, then
/// falls back to the raw text.
pub(crate) fn extract_error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let detail = match value.get("error") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(obj @ serde_json::Value::Object(_)) => obj
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        }
        .or_else(|| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });
        if let Some(detail) = detail.filter(|d| !d.trim().is_empty()) {
            return redact_credentials(detail.trim());
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        return "empty response body".to_string();
    }
    redact_credentials(&truncate_chars(raw, MAX_DETAIL_CHARS))
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

/// Read an API key from the environment variable named by `env_name`
pub(crate) fn api_key_from_env(env_name: &str, section: &str) -> Result<String, ClientError> {
    match std::env::var(env_name) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ClientError::Misconfiguration(format!(
            "API key not found in environment variable '{env_name}'. \
             Please set this variable or configure a different api_key_env in [{section}]."
        ))),
    }
}
