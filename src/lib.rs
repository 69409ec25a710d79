//! limbform - prosthetic leg cover designer
//!
//! limbform walks a user from a handful of style preferences to a generated
//! 3-D model of a prosthetic leg cover and hands the model link to a
//! manufacturer by email:
//!
//! ```text
//! preferences → description → 3-D model → email → view
//! ```
//!
//! It can be used in two ways:
//! - **CLI**: `limbform design` runs the whole flow interactively; `describe`,
//!   `model`, `email` and `view` run single steps against the session saved
//!   in the state directory.
//! - **Library**: build a [`DesignFlow`] with your own [`DescriptionService`],
//!   [`ModelService`], [`NotificationService`] and [`ModelProbe`]
//!   implementations, or the HTTP clients from [`services::build_flow`].
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! export LIMBFORM_TEXT_API_KEY=...
//! export LIMBFORM_MODEL_TOKEN=...
//! export LIMBFORM_NOTIFY_API_KEY=...
//!
//! limbform design --primary-color Red --design-style Geometric \
//!     --recipient maker@example.com
//! limbform view --open
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use limbform::{Config, PreferenceField, services};
//! use limbform::types::FlowStep;
//!
//! # async fn demo() -> Result<(), limbform::LimbformError> {
//! let config = Config::builder().recipient_email("maker@example.com").build()?;
//! let flow = services::build_flow(&config, &[FlowStep::Describe, FlowStep::Model])?;
//! flow.set_preference(PreferenceField::PrimaryColor, Some("Red".to_string()));
//! let generated = flow.describe().await?;
//! println!("{}", generated.description);
//! let model = flow.generate_model().await?;
//! println!("{:?}", model.model_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Stable Public API
//!
//! - [`DesignFlow`], [`FlowStage`], [`FlowSnapshot`] - flow orchestration
//! - [`PreferenceField`], [`PreferenceSelection`] - user preferences
//! - [`Config`] and [`ConfigBuilder`] - configuration management
//! - [`LimbformError`] - library error type
//! - [`ExitCode`] - CLI exit codes
//!
//! Internal modules are accessible via module paths but are marked `#[doc(hidden)]`
//! and are not covered by semver stability guarantees.

pub use limbform_flow::{
    DesignFlow, FlowSnapshot, FlowStage, Notice, NoticeLevel, PendingAuthorization,
    SessionState, SessionStore,
};

pub use limbform_prompt::{PreferenceField, PreferenceSelection};

pub use limbform_clients::{
    DescriptionService, EmailOutcome, GenerationResult, ModelProbe, ModelResult, ModelService,
    NotificationService, ViewerOutcome,
};

pub use limbform_config::{CliArgs, Config, ConfigBuilder, ConfigSource, EffectiveValue};

pub use limbform_utils::error::{ErrorCategory, LimbformError, UserFriendlyError};

pub use limbform_utils::exit_codes::ExitCode;

pub mod services;

#[must_use]
pub fn limbform_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[doc(hidden)]
pub use limbform_utils::{atomic_write, error, exit_codes, logging, redaction, types};

#[doc(hidden)]
pub use limbform_config as config;

#[doc(hidden)]
pub use limbform_prompt as prompt;

#[doc(hidden)]
pub use limbform_clients as clients;

#[doc(hidden)]
pub use limbform_flow as flow;

// CLI module - exported with #[doc(hidden)] for white-box testing of flag parsing
#[doc(hidden)]
pub mod cli;
