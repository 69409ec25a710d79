//! Text-generation client for design descriptions
//!
//! Talks to an OpenAI-compatible chat completions endpoint. One call per
//! request, no retry.

use crate::http_client::{HttpClient, api_key_from_env, map_status_error};
use async_trait::async_trait;
use limbform_config::{Config, defaults};
use limbform_prompt::{PreferenceSelection, build_description_prompt};
use limbform_utils::error::ClientError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "description";

/// Prefix that marked a failed description in older result payloads
const LEGACY_ERROR_PREFIX: &str = "Error";

/// A prompt and the description generated from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub prompt: String,
    pub description: String,
}

impl GenerationResult {
    /// True when the description itself encodes a failure (`"Error..."`).
    ///
    /// Such results still count as failures even though they arrive as `Ok`.
    #[must_use]
    pub fn is_legacy_error(&self) -> bool {
        self.description.trim_start().starts_with(LEGACY_ERROR_PREFIX)
    }
}

/// Produces a design description from a preference selection
#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Build the prompt and generate a description for it.
    ///
    /// # Errors
    ///
    /// `ClientError::BadRequest` for an empty selection (no call is made),
    /// otherwise whatever the remote call failed with.
    async fn generate_description(
        &self,
        selection: &PreferenceSelection,
    ) -> Result<GenerationResult, ClientError>;
}

/// Request parameters for the text endpoint
#[derive(Debug, Clone)]
pub(crate) struct DescriptionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for DescriptionParams {
    fn default() -> Self {
        Self {
            model: defaults::DESCRIPTION_MODEL.to_string(),
            max_tokens: defaults::DESCRIPTION_MAX_TOKENS,
            temperature: defaults::DESCRIPTION_TEMPERATURE,
        }
    }
}

/// `DescriptionService` backed by a chat completions endpoint
#[derive(Clone)]
pub struct HttpDescriptionClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
    params: DescriptionParams,
}

impl HttpDescriptionClient {
    /// Create a client from the `[description]` and `[http]` sections
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if:
    /// - The API key environment variable is not set
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, ClientError> {
        let section = &config.description;
        let api_key_env = section
            .api_key_env
            .as_deref()
            .unwrap_or(defaults::DESCRIPTION_API_KEY_ENV);
        let api_key = api_key_from_env(api_key_env, "description")?;

        let params = DescriptionParams {
            model: section
                .model
                .clone()
                .unwrap_or_else(|| defaults::DESCRIPTION_MODEL.to_string()),
            max_tokens: section
                .max_tokens
                .unwrap_or(defaults::DESCRIPTION_MAX_TOKENS),
            temperature: section
                .temperature
                .unwrap_or(defaults::DESCRIPTION_TEMPERATURE),
        };

        Ok(Self {
            client: HttpClient::from_config(config)?,
            base_url: section
                .base_url
                .clone()
                .unwrap_or_else(|| defaults::DESCRIPTION_BASE_URL.to_string()),
            api_key,
            params,
        })
    }

    fn request_body(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.params.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            stream: false,
        }
    }
}

#[async_trait]
impl DescriptionService for HttpDescriptionClient {
    async fn generate_description(
        &self,
        selection: &PreferenceSelection,
    ) -> Result<GenerationResult, ClientError> {
        let prompt = build_description_prompt(selection).ok_or_else(|| {
            ClientError::BadRequest("at least one preference must be selected".to_string())
        })?;

        debug!(
            service = SERVICE,
            model = %self.params.model,
            max_tokens = self.params.max_tokens,
            temperature = self.params.temperature,
            "Requesting description"
        );

        let request = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&prompt));
        let reply = self.client.send(request, SERVICE).await?;
        let description = interpret_description_response(reply.status, &reply.body)?;

        Ok(GenerationResult {
            prompt,
            description,
        })
    }
}

/// Extract the generated text from a chat completions reply
///
/// # Errors
///
/// - status-mapped `ClientError` for non-2xx replies
/// - `ClientError::InvalidResponse` when the body has no text in `choices[0]`
pub fn interpret_description_response(
    status: StatusCode,
    body: &str,
) -> Result<String, ClientError> {
    if !status.is_success() {
        return Err(map_status_error(status, SERVICE, body));
    }

    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        ClientError::InvalidResponse(format!("Failed to parse description response: {e}"))
    })?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            ClientError::InvalidResponse("description response missing content in choices[0]".to_string())
        })?;

    Ok(content)
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_legacy_error_detection() {
        let failed = GenerationResult {
            prompt: "p".to_string(),
            description: "Error generating description: quota".to_string(),
        };
        assert!(failed.is_legacy_error());

        let ok = GenerationResult {
            prompt: "p".to_string(),
            description: "A sleek red cover with an Error-free finish.".to_string(),
        };
        assert!(!ok.is_legacy_error());
    }

    #[test]
    fn test_interpret_success() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  A glossy red shell.  "}}]}"#;
        assert_eq!(
            interpret_description_response(StatusCode::OK, body).unwrap(),
            "A glossy red shell."
        );
    }

    #[test]
    fn test_interpret_missing_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert!(matches!(
            interpret_description_response(StatusCode::OK, body),
            Err(ClientError::InvalidResponse(_))
        ));
        assert!(matches!(
            interpret_description_response(StatusCode::OK, r#"{"choices":[]}"#),
            Err(ClientError::InvalidResponse(_))
        ));
        assert!(matches!(
            interpret_description_response(StatusCode::OK, "not json"),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_interpret_status_errors() {
        assert!(matches!(
            interpret_description_response(StatusCode::UNAUTHORIZED, ""),
            Err(ClientError::ProviderAuth(_))
        ));
        assert_eq!(
            interpret_description_response(
                StatusCode::BAD_REQUEST,
                r#"{"error":{"message":"max_tokens is too large"}}"#
            ),
            Err(ClientError::BadRequest("max_tokens is too large".to_string()))
        );
    }

    #[test]
    #[serial]
    fn test_new_from_config_missing_api_key() {
        let test_env_var = "LIMBFORM_TEXT_API_KEY_TEST_MISSING";
        unsafe {
            std::env::remove_var(test_env_var);
        }

        let mut config = Config::minimal_for_testing();
        config.description.api_key_env = Some(test_env_var.to_string());

        match HttpDescriptionClient::new_from_config(&config) {
            Err(ClientError::Misconfiguration(msg)) => {
                assert!(msg.contains(test_env_var), "got: {msg}");
                assert!(msg.contains("not found"), "got: {msg}");
            }
            _ => panic!("Expected Misconfiguration error for missing API key"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_empty_selection_is_rejected_before_any_call() {
        let test_env_var = "LIMBFORM_TEXT_API_KEY_TEST_EMPTY";
        unsafe {
            std::env::set_var(test_env_var, "test-key");
        }

        let mut config = Config::minimal_for_testing();
        config.description.api_key_env = Some(test_env_var.to_string());
        // Unroutable: a request would fail with Transport, not BadRequest
        config.description.base_url = Some("http://127.0.0.1:9/v1/chat/completions".to_string());
        let client = HttpDescriptionClient::new_from_config(&config).unwrap();

        let result = client
            .generate_description(&PreferenceSelection::new())
            .await;
        assert!(matches!(result, Err(ClientError::BadRequest(_))));

        unsafe {
            std::env::remove_var(test_env_var);
        }
    }

    #[test]
    fn test_request_body_shape() {
        let client = HttpDescriptionClient {
            client: HttpClient::new(std::time::Duration::from_secs(5), None).unwrap(),
            base_url: defaults::DESCRIPTION_BASE_URL.to_string(),
            api_key: "k".to_string(),
            params: DescriptionParams::default(),
        };
        let json = serde_json::to_value(client.request_body("Primary Color: red")).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Primary Color: red");
        assert_eq!(json["stream"], false);
    }
}
