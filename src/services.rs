//! Wiring of the HTTP clients into a [`DesignFlow`]
//!
//! Each command needs only some of the remote services; only those clients
//! are constructed so a missing key for an unused service is not an error.

use std::sync::Arc;

use limbform_clients::{
    HttpDescriptionClient, HttpModelClient, HttpModelProbe, HttpNotificationClient,
};
use limbform_config::{Config, defaults};
use limbform_flow::{DesignFlow, SessionStore};
use limbform_utils::error::LimbformError;
use limbform_utils::types::FlowStep;
use tracing::debug;

/// Fallback model URL with the default applied
#[must_use]
pub fn fallback_model_url(config: &Config) -> String {
    config
        .model
        .fallback_url
        .clone()
        .unwrap_or_else(|| defaults::MODEL_FALLBACK_URL.to_string())
}

/// Session store in the configured state directory
pub fn session_store(config: &Config) -> Result<SessionStore, LimbformError> {
    Ok(SessionStore::in_dir(&config.state_dir())?)
}

/// Build a flow with HTTP clients for `steps` and the session store attached.
///
/// # Errors
///
/// `ClientError::Misconfiguration` when a needed client cannot be built
/// (missing API key, missing sender or recipient), `StateError` when the
/// state directory is unusable.
pub fn build_flow(config: &Config, steps: &[FlowStep]) -> Result<DesignFlow, LimbformError> {
    let mut flow =
        DesignFlow::new(fallback_model_url(config)).with_session_store(session_store(config)?);

    for step in steps {
        debug!(step = %step, "Attaching service");
        flow = match step {
            FlowStep::Describe => flow
                .with_description_service(Arc::new(HttpDescriptionClient::new_from_config(config)?)),
            FlowStep::Model => {
                flow.with_model_service(Arc::new(HttpModelClient::new_from_config(config)?))
            }
            FlowStep::Email => flow.with_notification_service(Arc::new(
                HttpNotificationClient::new_from_config(config)?,
            )),
            FlowStep::View => flow.with_probe(Arc::new(HttpModelProbe::new_from_config(config)?)),
        };
    }

    Ok(flow)
}
