//! Configuration management for limbform
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. The TOML file has `[description]`, `[model]`,
//! `[notify]`, `[http]` and `[state]` sections. API keys never live in the
//! file; each section names the environment variable that holds its key.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;
pub use sources::EffectiveValue;
pub use limbform_utils::types::ConfigSource;

pub use limbform_utils::error;
