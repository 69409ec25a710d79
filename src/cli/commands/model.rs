//! `limbform model`

use anyhow::Result;
use serde::Serialize;

use super::common::{emit_json, print_notices};
use crate::services::build_flow;
use crate::types::FlowStep;
use crate::{Config, ExitCode, LimbformError, ModelResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelOutput {
    #[serde(flatten)]
    result: ModelResult,
    prompt: Option<String>,
}

/// Generate a model from `description`, or from the saved description
pub async fn execute_model_command(
    config: &Config,
    description: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let flow = build_flow(config, &[FlowStep::Model])?;
    flow.resume_from_session().map_err(LimbformError::from)?;
    if let Some(description) = description {
        flow.adopt_description(description);
    }

    let result = flow.generate_model().await.map_err(LimbformError::from)?;

    if json {
        let prompt = flow.snapshot().model_prompt;
        emit_json(&ModelOutput { result, prompt })?;
    } else {
        print_notices(&flow);
        println!("{}", result.model_url);
    }
    Ok(ExitCode::SUCCESS)
}
