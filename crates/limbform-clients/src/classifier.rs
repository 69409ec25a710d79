//! Classification of email-service replies
//!
//! The email orchestration service answers in natural language, sometimes as
//! a chat-completion JSON object and sometimes as a raw authorization
//! challenge. Classification order is fixed:
//!
//! 1. message content keywords (`sent`/`email`, then `authorize`/`url`)
//! 2. an explicit authorization-URL field in tool-call arguments
//! 3. failure
//!
//! Content that asks for authorization but carries no usable link fails
//! without consulting the tool-call arguments.
//!
//! A reply that is not JSON is scanned for an authorization URL first, then
//! for the sent keywords.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one email delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EmailOutcome {
    Sent {
        message: String,
    },
    /// The email tool needs user consent at `auth_url` before it can act
    AuthorizationRequired {
        auth_url: String,
        message: String,
    },
    Failed {
        message: String,
    },
}

impl EmailOutcome {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Sent { message }
            | Self::AuthorizationRequired { message, .. }
            | Self::Failed { message } => message,
        }
    }
}

/// Any http(s) URL
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"'`]+"#).expect("valid regex"));

/// An http(s) URL with an auth word in it
static AUTH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"'`]*(?:authenticate|authorize|auth)[^\s<>"'`]*"#)
        .expect("valid regex")
});

/// Characters stripped from the end of an extracted URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '>', '*'];

/// Tool-call argument keys that carry an authorization URL
const AUTH_URL_KEYS: &[&str] = &["authorization_url", "auth_url", "authorizationUrl", "url"];

const SENT_KEYWORDS: &[&str] = &["sent", "email"];
const AUTH_KEYWORDS: &[&str] = &["authorize", "url"];

const UNRECOGNIZED_REPLY: &str = "The email service reply did not confirm delivery";
const AUTH_WITHOUT_URL: &str =
    "The email service asked for authorization but did not include a usable link";

/// Classify a raw email-service reply.
///
/// `markers` are the substrings that make a URL acceptable as an
/// authorization link (case-insensitive).
#[must_use]
pub fn classify_reply(body: &str, markers: &[String]) -> EmailOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => classify_json(&value, markers),
        Err(_) => classify_text(body, markers),
    }
}

fn classify_text(text: &str, markers: &[String]) -> EmailOutcome {
    if let Some(auth_url) = extract_auth_url(text, markers) {
        return EmailOutcome::AuthorizationRequired {
            auth_url,
            message: text.trim().to_string(),
        };
    }
    if contains_any(text, SENT_KEYWORDS) {
        return EmailOutcome::Sent {
            message: text.trim().to_string(),
        };
    }
    EmailOutcome::Failed {
        message: failure_message(UNRECOGNIZED_REPLY, text),
    }
}

fn classify_json(value: &Value, markers: &[String]) -> EmailOutcome {
    let content = message_content(value).unwrap_or_default();

    if contains_any(&content, SENT_KEYWORDS) {
        return EmailOutcome::Sent { message: content };
    }

    if contains_any(&content, AUTH_KEYWORDS) {
        // An authorization request without a usable link is final
        return match extract_auth_url(&content, markers) {
            Some(auth_url) => EmailOutcome::AuthorizationRequired {
                auth_url,
                message: content,
            },
            None => EmailOutcome::Failed {
                message: failure_message(AUTH_WITHOUT_URL, &content),
            },
        };
    }

    if let Some(auth_url) = tool_call_auth_url(value) {
        let message = if content.is_empty() {
            "Authorization is required before the email can be sent".to_string()
        } else {
            content
        };
        return EmailOutcome::AuthorizationRequired { auth_url, message };
    }

    EmailOutcome::Failed {
        message: failure_message(UNRECOGNIZED_REPLY, &content),
    }
}

/// Find an authorization URL in free text.
///
/// The first URL is accepted when it contains one of `markers`; otherwise the
/// first URL with `authenticate`/`authorize`/`auth` in it is used. Trailing
/// punctuation is stripped in both cases.
#[must_use]
pub fn extract_auth_url(text: &str, markers: &[String]) -> Option<String> {
    if let Some(found) = URL.find(text) {
        let candidate = trim_url(found.as_str());
        let lowered = candidate.to_lowercase();
        if markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
        {
            return Some(candidate.to_string());
        }
    }

    AUTH_URL
        .find(text)
        .map(|found| trim_url(found.as_str()).to_string())
}

fn trim_url(url: &str) -> &str {
    url.trim_end_matches(TRAILING_PUNCTUATION)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

/// Assistant text of a chat-completion reply, or a bare message string
fn message_content(value: &Value) -> Option<String> {
    let from_choices = value
        .get("choices")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|choice| choice.pointer("/message/content").and_then(Value::as_str))
        .find(|content| !content.trim().is_empty());

    from_choices
        .or_else(|| value.get("message").and_then(Value::as_str))
        .or_else(|| value.as_str())
        .map(|content| content.trim().to_string())
}

fn tool_call_auth_url(value: &Value) -> Option<String> {
    let choices = value.get("choices").and_then(Value::as_array)?;
    choices
        .iter()
        .filter_map(|choice| choice.pointer("/message/tool_calls").and_then(Value::as_array))
        .flatten()
        .filter_map(|call| call.pointer("/function/arguments"))
        .find_map(auth_url_field)
}

/// Tool-call arguments arrive either as a JSON object or as a JSON string
fn auth_url_field(arguments: &Value) -> Option<String> {
    let parsed;
    let arguments = match arguments {
        Value::String(raw) => {
            parsed = serde_json::from_str::<Value>(raw).ok()?;
            &parsed
        }
        other => other,
    };

    AUTH_URL_KEYS
        .iter()
        .filter_map(|key| arguments.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|url| url.starts_with("http://") || url.starts_with("https://"))
        .map(str::to_string)
}

fn failure_message(headline: &str, reply: &str) -> String {
    let reply = reply.trim();
    if reply.is_empty() {
        return headline.to_string();
    }
    let excerpt: String = reply.chars().take(200).collect();
    format!("{headline}: {excerpt}")
}
