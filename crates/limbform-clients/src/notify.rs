//! Email notification client
//!
//! Sends the model link to the manufacturer through a tool-calling chat
//! endpoint. The request names exactly one tool; the reply is classified by
//! [`classify_reply`](crate::classify_reply).

use crate::classifier::{EmailOutcome, classify_reply};
use crate::http_client::{HttpClient, api_key_from_env, map_status_error};
use async_trait::async_trait;
use limbform_config::{Config, defaults};
use limbform_prompt::{build_email_instruction, draft_email};
use limbform_utils::error::{ClientError, UserFriendlyError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const SERVICE: &str = "notify";

/// What to email: the model link and, optionally, its description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub model_url: String,
    pub description: Option<String>,
}

/// Delivers a model link to the manufacturer
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Attempt delivery once. Failures are reported as
    /// [`EmailOutcome::Failed`], never as errors.
    async fn send_model_link(&self, request: &EmailRequest) -> EmailOutcome;
}

/// `NotificationService` backed by a tool-calling chat endpoint
#[derive(Clone)]
pub struct HttpNotificationClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    tool: String,
    sender: String,
    recipient: String,
    auth_url_markers: Vec<String>,
}

impl HttpNotificationClient {
    /// Create a client from the `[notify]` and `[http]` sections
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if:
    /// - The API key environment variable is not set
    /// - `sender_email` or `recipient_email` is not configured
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, ClientError> {
        let section = &config.notify;
        let api_key_env = section
            .api_key_env
            .as_deref()
            .unwrap_or(defaults::NOTIFY_API_KEY_ENV);
        let api_key = api_key_from_env(api_key_env, "notify")?;

        let sender = section.sender_email.clone().ok_or_else(|| {
            ClientError::Misconfiguration(
                "Sender not specified in configuration. \
                 Please set [notify] sender_email = \"you@example.com\"."
                    .to_string(),
            )
        })?;
        let recipient = section.recipient_email.clone().ok_or_else(|| {
            ClientError::Misconfiguration(
                "Recipient not specified in configuration. \
                 Please set [notify] recipient_email or pass --recipient."
                    .to_string(),
            )
        })?;

        Ok(Self {
            client: HttpClient::from_config(config)?,
            base_url: section
                .base_url
                .clone()
                .unwrap_or_else(|| defaults::NOTIFY_BASE_URL.to_string()),
            api_key,
            model: section
                .model
                .clone()
                .unwrap_or_else(|| defaults::NOTIFY_MODEL.to_string()),
            tool: section
                .tool
                .clone()
                .unwrap_or_else(|| defaults::NOTIFY_TOOL.to_string()),
            sender,
            recipient,
            auth_url_markers: section.auth_url_markers_or_default(),
        })
    }

    fn request_body(&self, request: &EmailRequest) -> NotifyRequest {
        let draft = draft_email(&request.model_url, request.description.as_deref());
        let instruction = build_email_instruction(&draft, &self.recipient, &self.tool);

        NotifyRequest {
            model: self.model.clone(),
            messages: vec![NotifyMessage {
                role: "user".to_string(),
                content: instruction,
            }],
            tools: vec![self.tool.clone()],
            tool_choice: "generate".to_string(),
            user: self.sender.clone(),
        }
    }
}

#[async_trait]
impl NotificationService for HttpNotificationClient {
    async fn send_model_link(&self, request: &EmailRequest) -> EmailOutcome {
        debug!(
            service = SERVICE,
            tool = %self.tool,
            recipient = %self.recipient,
            "Requesting email delivery"
        );

        let http_request = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request));

        let reply = match self.client.send(http_request, SERVICE).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(service = SERVICE, error = %e, "Email request failed");
                return EmailOutcome::Failed {
                    message: e.user_message(),
                };
            }
        };

        let outcome = interpret_notify_response(reply.status, &reply.body, &self.auth_url_markers);
        match &outcome {
            EmailOutcome::Sent { .. } => info!(service = SERVICE, "Email sent"),
            EmailOutcome::AuthorizationRequired { .. } => {
                info!(service = SERVICE, "Email tool needs authorization")
            }
            EmailOutcome::Failed { message } => {
                warn!(service = SERVICE, reason = %message, "Email not sent")
            }
        }
        outcome
    }
}

/// Classify an email endpoint reply.
///
/// Error statuses still get a chance to carry an authorization challenge;
/// anything else they say is a failure.
#[must_use]
pub fn interpret_notify_response(
    status: StatusCode,
    body: &str,
    auth_url_markers: &[String],
) -> EmailOutcome {
    let outcome = classify_reply(body, auth_url_markers);
    if status.is_success() {
        return outcome;
    }

    match outcome {
        auth @ EmailOutcome::AuthorizationRequired { .. } => auth,
        _ => EmailOutcome::Failed {
            message: map_status_error(status, SERVICE, body).user_message(),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
struct NotifyMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct NotifyRequest {
    model: String,
    messages: Vec<NotifyMessage>,
    tools: Vec<String>,
    tool_choice: String,
    user: String,
}
