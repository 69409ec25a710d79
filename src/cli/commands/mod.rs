//! CLI command implementations (facade).
//!
//! This module re-exports the command surface used by `run.rs`.
//! Implementations live in `commands/*`.

mod common;
mod config;
mod describe;
mod design;
mod email;
mod model;
mod view;

pub use config::execute_config_command;
pub use describe::execute_describe_command;
pub use design::{DesignOptions, execute_design_command, execute_list_options_command};
pub use email::execute_email_command;
pub use model::execute_model_command;
pub use view::execute_view_command;
