use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use limbform_utils::types::ConfigSource;

/// Built-in defaults for every configurable value
pub mod defaults {
    /// OpenAI-compatible chat completions endpoint used for descriptions
    pub const DESCRIPTION_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
    pub const DESCRIPTION_MODEL: &str = "gpt-4o-mini";
    pub const DESCRIPTION_MAX_TOKENS: u32 = 1024;
    pub const DESCRIPTION_TEMPERATURE: f32 = 0.7;
    pub const DESCRIPTION_API_KEY_ENV: &str = "LIMBFORM_TEXT_API_KEY";

    /// Synchronous actor run that returns the actor's output record
    pub const MODEL_ACTOR_URL: &str =
        "https://api.apify.com/v2/acts/limbform~prosthetic-model-generator/run-sync";
    pub const MODEL_API_KEY_ENV: &str = "LIMBFORM_MODEL_TOKEN";
    pub const MODEL_HEADED: bool = false;
    /// Shown when the generated model cannot be loaded
    pub const MODEL_FALLBACK_URL: &str =
        "https://modelviewer.dev/shared-assets/models/Astronaut.glb";

    pub const NOTIFY_BASE_URL: &str = "https://api.arcade.dev/v1/chat/completions";
    pub const NOTIFY_MODEL: &str = "gpt-4o";
    pub const NOTIFY_API_KEY_ENV: &str = "LIMBFORM_NOTIFY_API_KEY";
    pub const NOTIFY_TOOL: &str = "Google.SendEmail";
    pub const NOTIFY_AUTH_URL_MARKERS: &[&str] = &["accounts.google.com", "oauth"];

    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 30;

    /// Directory name used for discovery and the default state directory
    pub const DIR_NAME: &str = ".limbform";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
    pub const HOME_ENV: &str = "LIMBFORM_HOME";
}

/// Configuration for limbform operations.
///
/// Built by [`Config::discover`] (CLI semantics) or [`Config::builder`]
/// (embedding and tests).
///
/// # Configuration File Format
///
/// ```toml
/// [description]
/// model = "gpt-4o-mini"
/// api_key_env = "LIMBFORM_TEXT_API_KEY"
///
/// [model]
/// actor_url = "https://api.apify.com/v2/acts/me~generator/run-sync"
///
/// [notify]
/// sender_email = "studio@example.com"
/// recipient_email = "maker@example.com"
///
/// [http]
/// timeout_secs = 300
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Text-generation service settings
    pub description: DescriptionConfig,
    /// 3-D model service settings
    pub model: ModelConfig,
    /// Email orchestration service settings
    pub notify: NotifyConfig,
    /// Shared HTTP client settings
    pub http: HttpConfig,
    /// Session store settings
    pub state: StateConfig,
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
    /// Source attribution for each setting (for `limbform config`).
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[description]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptionConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub api_key_env: Option<String>,
}

/// `[model]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub actor_url: Option<String>,
    pub api_key_env: Option<String>,
    pub headed: Option<bool>,
    pub fallback_url: Option<String>,
}

/// `[notify]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    /// Account the email is sent from; sent as the `user` field
    pub sender_email: Option<String>,
    /// Manufacturer address
    pub recipient_email: Option<String>,
    pub tool: Option<String>,
    /// Substrings that mark a URL in a reply as an authorization link
    pub auth_url_markers: Option<Vec<String>>,
}

/// `[http]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Whole-request timeout. Unset means the transport default (none).
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

/// `[state]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    pub dir: Option<PathBuf>,
}

impl NotifyConfig {
    /// Authorization markers with the built-in list as fallback
    #[must_use]
    pub fn auth_url_markers_or_default(&self) -> Vec<String> {
        match &self.auth_url_markers {
            Some(markers) => markers.clone(),
            None => defaults::NOTIFY_AUTH_URL_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
        }
    }
}

impl Config {
    /// State directory: `[state].dir`, else the directory holding the config
    /// file, else `./.limbform`.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state.dir {
            return dir.clone();
        }
        if let Some(parent) = self.config_path.as_ref().and_then(|p| p.parent()) {
            return parent.to_path_buf();
        }
        PathBuf::from(defaults::DIR_NAME)
    }

    /// Connect timeout with default applied
    #[must_use]
    pub fn connect_timeout_secs(&self) -> u64 {
        self.http
            .connect_timeout_secs
            .unwrap_or(defaults::HTTP_CONNECT_TIMEOUT_SECS)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Config {
    /// Create a minimal Config for testing purposes
    ///
    /// Sender and recipient are filled in so email clients can be built; the
    /// state directory is left unset.
    pub fn minimal_for_testing() -> Self {
        Config {
            notify: NotifyConfig {
                sender_email: Some("studio@example.com".to_string()),
                recipient_email: Some("maker@example.com".to_string()),
                ..NotifyConfig::default()
            },
            ..Config::default()
        }
    }
}
