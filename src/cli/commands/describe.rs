//! `limbform describe`

use anyhow::Result;
use serde::Serialize;

use super::common::{emit_json, print_notices};
use crate::cli::args::PreferenceArgs;
use crate::services::build_flow;
use crate::types::FlowStep;
use crate::{Config, ExitCode, FlowStage, LimbformError, PreferenceSelection};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DescribeOutput {
    selection: PreferenceSelection,
    prompt: String,
    description: String,
    stage: FlowStage,
}

pub async fn execute_describe_command(
    config: &Config,
    preferences: &PreferenceArgs,
    json: bool,
) -> Result<ExitCode> {
    let flow = build_flow(config, &[FlowStep::Describe])?;
    flow.set_selection(preferences.to_selection());

    let generated = flow.describe().await.map_err(LimbformError::from)?;

    if json {
        emit_json(&DescribeOutput {
            selection: flow.selection(),
            prompt: generated.prompt,
            description: generated.description,
            stage: flow.stage(),
        })?;
    } else {
        print_notices(&flow);
        println!("{}", generated.description);
    }
    Ok(ExitCode::SUCCESS)
}
