//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;
use tracing::debug;

use super::args::{Cli, Commands};
use super::commands;

use crate::{CliArgs, Config, ExitCode, LimbformError};
use limbform_utils::logging::init_tracing;
use limbform_utils::redaction::redact_error_message;

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints a user-facing report, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // A second subscriber is only possible in tests; ignore that case
    let _ = init_tracing(cli.verbose);

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        state_dir: cli.state_dir.clone(),
        description_model: cli.description_model.clone(),
        sender_email: cli.sender.clone(),
        recipient_email: cli.recipient.clone(),
        timeout_secs: cli.timeout,
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = LimbformError::from(err);
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let json = cli.json;
    debug!(command = cli.command.name(), json, "Dispatching command");

    let result = rt.block_on(async {
        match cli.command {
            Commands::Design {
                preferences,
                list_options,
                no_email,
                browser,
                open,
            } => {
                if list_options {
                    return commands::execute_list_options_command(json);
                }
                let options = commands::DesignOptions {
                    preferences,
                    no_email,
                    browser,
                    open,
                    json,
                };
                commands::execute_design_command(&config, options).await
            }
            Commands::Describe { preferences } => {
                commands::execute_describe_command(&config, &preferences, json).await
            }
            Commands::Model { description } => {
                commands::execute_model_command(&config, description, json).await
            }
            Commands::Email {
                model_url,
                description,
                browser,
            } => {
                commands::execute_email_command(&config, model_url, description, browser, json)
                    .await
            }
            Commands::View { model_url, open } => {
                commands::execute_view_command(&config, model_url, open, json).await
            }
            Commands::Config => commands::execute_config_command(&config, json),
        }
    });

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(err) => {
            if let Some(limbform_err) = err.downcast_ref::<LimbformError>() {
                eprintln!("{}", limbform_err.display_for_user());
                Err(limbform_err.to_exit_code())
            } else {
                eprintln!("✗ Unexpected error: {}", redact_error_message(&format!("{err:#}")));
                Err(ExitCode::INTERNAL)
            }
        }
    }
}
