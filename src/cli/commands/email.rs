//! `limbform email`

use anyhow::Result;
use serde::Serialize;

use super::common::{deliver_email, emit_json};
use crate::services::build_flow;
use crate::types::FlowStep;
use crate::{Config, EmailOutcome, ExitCode, LimbformError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailOutput {
    model_url: Option<String>,
    #[serde(flatten)]
    outcome: EmailOutcome,
}

/// Email the saved (or given) model link to the manufacturer
pub async fn execute_email_command(
    config: &Config,
    model_url: Option<String>,
    description: Option<String>,
    browser: bool,
    json: bool,
) -> Result<ExitCode> {
    let flow = build_flow(config, &[FlowStep::Email])?;
    flow.resume_from_session().map_err(LimbformError::from)?;
    if let Some(description) = description {
        flow.adopt_description(description);
    }
    if let Some(url) = model_url {
        flow.adopt_model_url(url);
    }

    let (outcome, code) = deliver_email(&flow, browser, json).await?;

    if json {
        emit_json(&EmailOutput {
            model_url: flow.model_url(),
            outcome,
        })?;
    } else if let EmailOutcome::Sent { message } = &outcome {
        println!("{message}");
    }
    Ok(code)
}
