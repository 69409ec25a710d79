use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::types::FlowStep;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `LimbformError` is the primary error type returned by limbform library operations.
/// It wraps the per-layer errors so callers can match on the layer that failed:
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or CLI argument errors |
/// | `Client` | Outbound HTTP call failures |
/// | `Flow` | Step gating, re-entrancy and step failures |
/// | `State` | Session store read/write failures |
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes and
/// [`display_for_user()`](Self::display_for_user) for a message with suggestions.
///
/// Library code returns `LimbformError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum LimbformError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Remote service error: {0}")]
    Client(#[from] ClientError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Session state error: {0}")]
    State(#[from] StateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    UserInput,
    RemoteService,
    Authorization,
    FileSystem,
    Concurrency,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::UserInput => write!(f, "User Input"),
            Self::RemoteService => write!(f, "Remote Service"),
            Self::Authorization => write!(f, "Authorization"),
            Self::FileSystem => write!(f, "File System"),
            Self::Concurrency => write!(f, "Concurrency"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

/// Errors raised at the boundary of an outbound service call.
///
/// Every client converts transport failures, unexpected statuses and malformed
/// bodies into one of these variants; nothing escapes a client as a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// The provider rejected the request (400) with the given message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The provider answered but the body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request exceeded the configured timeout
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Client could not be constructed from configuration
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}

/// Session store errors
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to access session file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Session file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Errors surfaced by the design flow orchestrator.
///
/// Step failures carry the already user-facing message produced by the client
/// layer, because the orchestrator also shows them as notices.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("No preference selected; choose at least one option before generating")]
    EmptySelection,

    #[error("Step '{0}' is already running")]
    Busy(FlowStep),

    #[error("Step '{step}' is not available yet: {reason}")]
    NotReady { step: FlowStep, reason: String },

    #[error("Description generation failed: {0}")]
    Description(String),

    #[error("Model generation failed: {0}")]
    Model(String),

    #[error("Email delivery failed: {0}")]
    Notification(String),

    #[error("Model viewer failed: {0}")]
    Viewer(String),

    #[error("Session state error: {0}")]
    State(#[from] StateError),
}

impl FlowError {
    /// The step this error belongs to, if any
    #[must_use]
    pub fn step(&self) -> Option<FlowStep> {
        match self {
            Self::EmptySelection | Self::Description(_) => Some(FlowStep::Describe),
            Self::Busy(step) | Self::NotReady { step, .. } => Some(*step),
            Self::Model(_) => Some(FlowStep::Model),
            Self::Notification(_) => Some(FlowStep::Email),
            Self::Viewer(_) => Some(FlowStep::View),
            Self::State(_) => None,
        }
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(msg) => format!("Configuration file is invalid: {msg}"),
            Self::MissingRequired(key) => format!("Required configuration '{key}' is missing"),
            Self::InvalidValue { key, value } => {
                format!("Configuration value for '{key}' is invalid: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Configuration is loaded from CLI flags, .limbform/config.toml, and built-in defaults."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .limbform/config.toml".to_string(),
                "Run 'limbform config' to see the effective configuration".to_string(),
            ],
            Self::MissingRequired(_) => vec![
                "Add the missing key to .limbform/config.toml".to_string(),
                "Export the API key environment variable named by api_key_env".to_string(),
            ],
            Self::InvalidValue { .. } => vec![
                "Fix the value in .limbform/config.toml or pass a valid CLI flag".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Check the --config path".to_string(),
                "Unset LIMBFORM_HOME to use upward discovery instead".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for ClientError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("Could not reach the service: {msg}"),
            Self::ProviderAuth(msg) => format!("The service rejected our credentials: {msg}"),
            Self::ProviderQuota(msg) => format!("The service rate limit was exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("The service is unavailable: {msg}"),
            Self::BadRequest(msg) => format!("The service rejected the request: {msg}"),
            Self::InvalidResponse(msg) => format!("The service sent an unexpected reply: {msg}"),
            Self::Timeout { duration } => format!("The service did not answer within {duration:?}"),
            Self::Misconfiguration(msg) => format!("Service client is misconfigured: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => {
                Some("The request did not complete at the network level.".to_string())
            }
            Self::ProviderAuth(_) => {
                Some("Authentication errors indicate missing or invalid API keys.".to_string())
            }
            Self::ProviderQuota(_) | Self::ProviderOutage(_) => {
                Some("The remote service is refusing work for now.".to_string())
            }
            Self::BadRequest(_) | Self::InvalidResponse(_) => None,
            Self::Misconfiguration(_) => Some(
                "Configuration errors indicate missing or invalid service settings.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => vec![
                "Check network connectivity".to_string(),
                "Try the same action again".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Check that the API key environment variable is set".to_string(),
                "Verify the key is valid and not expired".to_string(),
            ],
            Self::ProviderQuota(_) | Self::ProviderOutage(_) => {
                vec!["Wait a few minutes and try again".to_string()]
            }
            Self::BadRequest(_) => vec!["Adjust your selections and try again".to_string()],
            Self::InvalidResponse(_) => vec!["Try the same action again".to_string()],
            Self::Misconfiguration(_) => {
                vec!["Check the service sections in .limbform/config.toml".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderAuth(_) => ErrorCategory::Authorization,
            Self::Misconfiguration(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::RemoteService,
        }
    }
}

impl UserFriendlyError for StateError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some("The session file carries the last description and model URL between commands.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Io { .. } => vec!["Check permissions on the state directory".to_string()],
            Self::Corrupt { .. } => vec![
                "Delete session.json and regenerate the description and model".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::FileSystem
    }
}

impl UserFriendlyError for FlowError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotReady { .. } => {
                Some("Steps run in order: describe, model, then email or view.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptySelection => {
                vec!["Pass at least one preference, e.g. --primary-color red".to_string()]
            }
            Self::Busy(_) => vec!["Wait for the running step to finish".to_string()],
            Self::NotReady { step, .. } => match step {
                FlowStep::Model => vec!["Run 'limbform describe' first".to_string()],
                _ => vec!["Run 'limbform model' first".to_string()],
            },
            Self::Description(_) | Self::Model(_) | Self::Notification(_) | Self::Viewer(_) => {
                vec!["Try the same action again".to_string()]
            }
            Self::State(inner) => inner.suggestions(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptySelection | Self::NotReady { .. } => ErrorCategory::UserInput,
            Self::Busy(_) => ErrorCategory::Concurrency,
            Self::State(_) => ErrorCategory::FileSystem,
            _ => ErrorCategory::RemoteService,
        }
    }
}

impl UserFriendlyError for LimbformError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Client(e) => e.user_message(),
            Self::Flow(e) => e.user_message(),
            Self::State(e) => e.user_message(),
            Self::Io(e) => format!("File system error: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Client(e) => e.context(),
            Self::Flow(e) => e.context(),
            Self::State(e) => e.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Client(e) => e.suggestions(),
            Self::Flow(e) => e.suggestions(),
            Self::State(e) => e.suggestions(),
            Self::Io(_) => vec!["Check file permissions and free disk space".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Client(e) => e.category(),
            Self::Flow(e) => e.category(),
            Self::State(e) => e.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl LimbformError {
    /// Format the error with context and suggestions for terminal output
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut out = format!("✗ {}", self.user_message());
        if let Some(context) = self.context() {
            out.push_str(&format!("\n  {context}"));
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\n\nSuggestions:");
            for suggestion in suggestions {
                out.push_str(&format!("\n  • {suggestion}"));
            }
        }
        out
    }
}
