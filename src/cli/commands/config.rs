//! `limbform config`

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use super::common::emit_json;
use crate::{Config, EffectiveValue, ExitCode};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOutput {
    config_file: Option<String>,
    state_dir: String,
    values: BTreeMap<String, EffectiveValue>,
}

/// Show every effective setting and where it came from
pub fn execute_config_command(config: &Config, json: bool) -> Result<ExitCode> {
    let output = ConfigOutput {
        config_file: config.config_path.as_ref().map(|p| p.display().to_string()),
        state_dir: config.state_dir().display().to_string(),
        values: config.effective_config(),
    };

    if json {
        emit_json(&output)?;
        return Ok(ExitCode::SUCCESS);
    }

    match &output.config_file {
        Some(path) => println!("Config file: {path}"),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("State dir:   {}", output.state_dir);
    println!();

    let width = output.values.keys().map(String::len).max().unwrap_or(0);
    for (key, effective) in &output.values {
        println!(
            "{key:<width$} = {}  ({})",
            effective.value, effective.source
        );
    }
    Ok(ExitCode::SUCCESS)
}
