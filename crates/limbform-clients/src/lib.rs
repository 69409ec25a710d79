//! Clients for the remote services behind the design flow
//!
//! Each service sits behind an async trait so the flow can run against fakes:
//!
//! | Trait | HTTP implementation | Service |
//! |-------|---------------------|---------|
//! | [`DescriptionService`] | [`HttpDescriptionClient`] | OpenAI-compatible text generation |
//! | [`ModelService`] | [`HttpModelClient`] | synchronous 3-D generator actor |
//! | [`NotificationService`] | [`HttpNotificationClient`] | tool-calling email orchestration |
//! | [`ModelProbe`] | [`HttpModelProbe`] | HEAD probe before viewing |
//!
//! Every implementation is built with `new_from_config` and reads its key
//! from the environment variable named in configuration.

mod classifier;
mod description;
pub(crate) mod http_client;
mod model;
mod notify;
mod viewer;

pub use classifier::{EmailOutcome, classify_reply, extract_auth_url};
pub use description::{
    DescriptionService, GenerationResult, HttpDescriptionClient, interpret_description_response,
};
pub use model::{HttpModelClient, ModelResult, ModelService, interpret_model_response};
pub use notify::{
    EmailRequest, HttpNotificationClient, NotificationService, interpret_notify_response,
};
pub use viewer::{HttpModelProbe, ModelProbe, ViewerOutcome, resolve_viewable_url};

pub use reqwest::StatusCode;
