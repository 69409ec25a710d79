//! 3-D model generation client
//!
//! Runs the generator actor synchronously: `POST {prompt, headed}` to the
//! actor URL with the token in the query string. The actor's output record
//! comes back as the response body, `{"status": "success", "resultUrl": ...}`
//! on success.
//!
//! This boundary never fails: every outcome, including transport errors, is a
//! [`ModelResult`].

use crate::http_client::{HttpClient, api_key_from_env, extract_error_detail, map_status_error};
use async_trait::async_trait;
use limbform_config::{Config, defaults};
use limbform_utils::error::{ClientError, UserFriendlyError};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SERVICE: &str = "model";

/// Outcome of one model generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResult {
    pub success: bool,
    /// Empty on failure
    pub model_url: String,
    pub message: String,
}

impl ModelResult {
    #[must_use]
    pub fn succeeded(model_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            model_url: model_url.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            model_url: String::new(),
            message: message.into(),
        }
    }
}

/// Generates a 3-D model file from a model prompt
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn generate_model(&self, prompt: &str) -> ModelResult;
}

/// `ModelService` backed by a synchronous actor run
#[derive(Clone)]
pub struct HttpModelClient {
    client: HttpClient,
    /// Actor URL with the token query parameter applied
    run_url: Url,
    headed: bool,
}

impl HttpModelClient {
    /// Create a client from the `[model]` and `[http]` sections
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if:
    /// - The token environment variable is not set
    /// - The actor URL does not parse
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, ClientError> {
        let section = &config.model;
        let token_env = section
            .api_key_env
            .as_deref()
            .unwrap_or(defaults::MODEL_API_KEY_ENV);
        let token = api_key_from_env(token_env, "model")?;

        let actor_url = section
            .actor_url
            .as_deref()
            .unwrap_or(defaults::MODEL_ACTOR_URL);
        let mut run_url = Url::parse(actor_url).map_err(|e| {
            ClientError::Misconfiguration(format!("Invalid model.actor_url '{actor_url}': {e}"))
        })?;
        run_url.query_pairs_mut().append_pair("token", &token);

        Ok(Self {
            client: HttpClient::from_config(config)?,
            run_url,
            headed: section.headed.unwrap_or(defaults::MODEL_HEADED),
        })
    }
}

#[async_trait]
impl ModelService for HttpModelClient {
    async fn generate_model(&self, prompt: &str) -> ModelResult {
        debug!(
            service = SERVICE,
            prompt_len = prompt.len(),
            headed = self.headed,
            "Requesting 3-D model"
        );

        let body = ModelRequest {
            prompt,
            headed: self.headed,
        };
        let request = self.client.post(self.run_url.clone()).json(&body);

        match self.client.send(request, SERVICE).await {
            Ok(reply) => interpret_model_response(reply.status, &reply.body),
            Err(e) => {
                warn!(service = SERVICE, error = %e, "Model request failed");
                ModelResult::failed(e.user_message())
            }
        }
    }
}

/// Turn a model endpoint reply into a [`ModelResult`].
///
/// A 400 carries the JSON `error`/`message` detail when the body has one and
/// the raw body text otherwise. Any other non-2xx status, a non-`"success"`
/// status field, or a missing `resultUrl` is a failure.
#[must_use]
pub fn interpret_model_response(status: StatusCode, body: &str) -> ModelResult {
    if status == StatusCode::BAD_REQUEST {
        return ModelResult::failed(format!(
            "Model service rejected the request: {}",
            extract_error_detail(body)
        ));
    }

    if !status.is_success() {
        let err = map_status_error(status, SERVICE, body);
        return ModelResult::failed(err.user_message());
    }

    let output: ModelOutput = match serde_json::from_str(body) {
        Ok(output) => output,
        Err(e) => {
            return ModelResult::failed(format!("Model service sent an unreadable reply: {e}"));
        }
    };

    let result_url = output
        .result_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    match (output.status.as_deref(), result_url) {
        (Some("success"), Some(url)) => ModelResult::succeeded(
            url,
            output
                .message
                .unwrap_or_else(|| "3D model generated".to_string()),
        ),
        (Some("success"), None) => {
            ModelResult::failed("Model service reported success without a resultUrl")
        }
        (other, _) => {
            let detail = output
                .message
                .or_else(|| output.error.as_ref().map(error_text))
                .unwrap_or_else(|| format!("status {}", other.unwrap_or("missing")));
            ModelResult::failed(format!("Model generation did not succeed: {detail}"))
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelRequest<'a> {
    prompt: &'a str,
    headed: bool,
}

/// Actor output record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelOutput {
    status: Option<String>,
    result_url: Option<String>,
    message: Option<String>,
    error: Option<serde_json::Value>,
}

fn error_text(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(|m| m.as_str())
            .map_or_else(|| other.to_string(), str::to_string),
    }
}
