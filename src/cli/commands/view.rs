//! `limbform view`

use anyhow::Result;

use super::common::{emit_json, open_in_browser, print_notices};
use crate::services::build_flow;
use crate::types::FlowStep;
use crate::{Config, ExitCode, LimbformError};

/// Resolve a viewable URL for the saved (or given) model
pub async fn execute_view_command(
    config: &Config,
    model_url: Option<String>,
    open: bool,
    json: bool,
) -> Result<ExitCode> {
    let flow = build_flow(config, &[FlowStep::View])?;
    flow.resume_from_session().map_err(LimbformError::from)?;
    if let Some(url) = model_url {
        flow.adopt_model_url(url);
    }

    let outcome = flow.view().await.map_err(LimbformError::from)?;

    if json {
        emit_json(&outcome)?;
    } else {
        print_notices(&flow);
        println!("{}", outcome.url);
    }
    if open {
        open_in_browser(&outcome.url);
    }
    Ok(ExitCode::SUCCESS)
}
