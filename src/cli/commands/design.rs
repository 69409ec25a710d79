//! `limbform design`: the whole flow in one command

use anyhow::Result;
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::info;

use super::common::{
    deliver_email, emit_json, open_in_browser, print_notices, prompt_line, stdin_is_interactive,
};
use crate::cli::args::PreferenceArgs;
use crate::error::FlowError;
use crate::services::build_flow;
use crate::types::FlowStep;
use crate::{
    Config, EmailOutcome, ExitCode, FlowSnapshot, LimbformError, PreferenceField,
    PreferenceSelection,
};

/// Flags of `limbform design` besides the preferences
#[derive(Debug, Clone)]
pub struct DesignOptions {
    pub preferences: PreferenceArgs,
    pub no_email: bool,
    pub browser: bool,
    pub open: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct DesignOutput {
    #[serde(flatten)]
    snapshot: FlowSnapshot,
    email: Option<EmailOutcome>,
}

#[derive(Serialize)]
struct FieldOptions {
    field: String,
    label: &'static str,
    options: &'static [&'static str],
}

/// Print the suggested options for every preference field
pub fn execute_list_options_command(json: bool) -> Result<ExitCode> {
    if json {
        let fields: Vec<FieldOptions> = PreferenceField::iter()
            .map(|field| FieldOptions {
                field: field.to_string(),
                label: field.label(),
                options: field.options(),
            })
            .collect();
        emit_json(&fields)?;
    } else {
        for field in PreferenceField::iter() {
            println!("{} (--{field})", field.label());
            for option in field.options() {
                println!("  {option}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Ask for each field in turn; blank answers leave the field unset
fn prompt_for_selection() -> Result<PreferenceSelection> {
    let mut selection = PreferenceSelection::new();
    eprintln!("Choose your preferences (press Enter to skip a field).");
    for field in PreferenceField::iter() {
        let question = format!("{} [{}]: ", field.label(), field.options().join(", "));
        match prompt_line(&question)? {
            Some(answer) if !answer.is_empty() => selection.set(field, Some(answer)),
            Some(_) => {}
            None => break,
        }
    }
    Ok(selection)
}

fn gather_selection(preferences: &PreferenceArgs, json: bool) -> Result<PreferenceSelection> {
    if preferences.is_unset() && !json && stdin_is_interactive() {
        return prompt_for_selection();
    }
    Ok(preferences.to_selection())
}

pub async fn execute_design_command(config: &Config, options: DesignOptions) -> Result<ExitCode> {
    let json = options.json;
    let selection = gather_selection(&options.preferences, json)?;

    let steps: &[FlowStep] = if options.no_email {
        &[FlowStep::Describe, FlowStep::Model, FlowStep::View]
    } else {
        &[FlowStep::Describe, FlowStep::Model, FlowStep::Email, FlowStep::View]
    };
    let flow = build_flow(config, steps)?;
    flow.set_selection(selection);

    let generated = flow.describe().await.map_err(LimbformError::from)?;
    if !json {
        print_notices(&flow);
        println!("Description:\n{}\n", generated.description);
        eprintln!("Generating 3D model...");
    }

    let model = flow.generate_model().await.map_err(LimbformError::from)?;
    if !json {
        print_notices(&flow);
        println!("Model: {}", model.model_url);
    }

    let mut code = ExitCode::SUCCESS;
    let email = if options.no_email {
        info!("Skipping email");
        None
    } else {
        match deliver_email(&flow, options.browser, json).await {
            Ok((outcome, email_code)) => {
                code = email_code;
                Some(outcome)
            }
            // A failed email leaves the model in place; report it and go on to the viewer
            Err(err) => match err.downcast::<LimbformError>() {
                Ok(LimbformError::Flow(FlowError::Notification(message))) => {
                    if !json {
                        let report = LimbformError::Flow(FlowError::Notification(message.clone()));
                        eprintln!("{}", report.display_for_user());
                    }
                    code = ExitCode::REMOTE_FAILURE;
                    Some(EmailOutcome::Failed { message })
                }
                Ok(other) => return Err(other.into()),
                Err(other) => return Err(other),
            },
        }
    };

    let viewer = flow.view().await.map_err(LimbformError::from)?;
    if json {
        emit_json(&DesignOutput {
            snapshot: flow.snapshot(),
            email,
        })?;
    } else {
        print_notices(&flow);
        println!("View: {}", viewer.url);
    }
    if options.open {
        open_in_browser(&viewer.url);
    }

    Ok(code)
}
