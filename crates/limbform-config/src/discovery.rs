use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use limbform_utils::error::ConfigError;

use super::{
    CliArgs, Config, ConfigSource, DescriptionConfig, HttpConfig, ModelConfig, NotifyConfig,
    StateConfig, defaults,
};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    description: Option<DescriptionConfig>,
    model: Option<ModelConfig>,
    notify: Option<NotifyConfig>,
    http: Option<HttpConfig>,
    state: Option<StateConfig>,
}

/// Keys that always have a built-in default, attributed before any override
const DEFAULTED_KEYS: &[&str] = &[
    "description.base_url",
    "description.model",
    "description.max_tokens",
    "description.temperature",
    "description.api_key_env",
    "model.actor_url",
    "model.api_key_env",
    "model.headed",
    "model.fallback_url",
    "notify.base_url",
    "notify.model",
    "notify.api_key_env",
    "notify.tool",
    "notify.auth_url_markers",
    "http.connect_timeout_secs",
    "state.dir",
];

/// Copy `Some` values from a file section into the config, recording the source
macro_rules! merge {
    ($attr:expr, $source:expr, $target:expr, $file:expr, $section:literal: $($field:ident),+ $(,)?) => {
        $(
            if $file.$field.is_some() {
                $target.$field = $file.$field.take();
                $attr.insert(concat!($section, ".", stringify!($field)).to_string(), $source);
            }
        )+
    };
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir()
            .map_err(|e| ConfigError::InvalidFile(format!("Failed to get current directory: {e}")))?;
        let home = std::env::var_os(defaults::HOME_ENV).map(PathBuf::from);
        Self::discover_from(&start_dir, home.as_deref(), cli_args)
    }

    /// Discover configuration starting from a specific directory.
    ///
    /// This is the path-driven variant used by tests to avoid process-global
    /// state. `home` plays the role of `LIMBFORM_HOME`.
    pub fn discover_from(
        start_dir: &Path,
        home: Option<&Path>,
        cli_args: &CliArgs,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        let mut attribution: HashMap<String, ConfigSource> = DEFAULTED_KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Default))
            .collect();

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    });
                }
                Some(explicit.clone())
            }
            None => match home {
                Some(home) => {
                    let candidate = home.join(defaults::CONFIG_FILE_NAME);
                    candidate.is_file().then_some(candidate)
                }
                None => Self::discover_config_file_from(start_dir),
            },
        };

        if let Some(path) = &config_path {
            let mut file = Self::load_config_file(path)
                .map_err(|e| ConfigError::InvalidFile(format!("{e:#}")))?;
            let src = ConfigSource::Config;

            if let Some(mut section) = file.description.take() {
                merge!(attribution, src, config.description, section, "description":
                    base_url, model, max_tokens, temperature, api_key_env);
            }
            if let Some(mut section) = file.model.take() {
                merge!(attribution, src, config.model, section, "model":
                    actor_url, api_key_env, headed, fallback_url);
            }
            if let Some(mut section) = file.notify.take() {
                merge!(attribution, src, config.notify, section, "notify":
                    base_url, model, api_key_env, sender_email, recipient_email, tool,
                    auth_url_markers);
            }
            if let Some(mut section) = file.http.take() {
                merge!(attribution, src, config.http, section, "http":
                    timeout_secs, connect_timeout_secs);
            }
            if let Some(mut section) = file.state.take() {
                // Relative state dirs resolve against the config file's directory
                if let Some(dir) = section.dir.take() {
                    let resolved = match path.parent() {
                        Some(parent) if dir.is_relative() => parent.join(dir),
                        _ => dir,
                    };
                    config.state.dir = Some(resolved);
                    attribution.insert("state.dir".to_string(), src);
                }
            }
        }

        let cli = ConfigSource::Cli;
        if let Some(dir) = &cli_args.state_dir {
            config.state.dir = Some(dir.clone());
            attribution.insert("state.dir".to_string(), cli);
        }
        if let Some(model) = &cli_args.description_model {
            config.description.model = Some(model.clone());
            attribution.insert("description.model".to_string(), cli);
        }
        if let Some(sender) = &cli_args.sender_email {
            config.notify.sender_email = Some(sender.clone());
            attribution.insert("notify.sender_email".to_string(), cli);
        }
        if let Some(recipient) = &cli_args.recipient_email {
            config.notify.recipient_email = Some(recipient.clone());
            attribution.insert("notify.recipient_email".to_string(), cli);
        }
        if let Some(timeout) = cli_args.timeout_secs {
            config.http.timeout_secs = Some(timeout);
            attribution.insert("http.timeout_secs".to_string(), cli);
        }

        config.config_path = config_path;
        config.source_attribution = attribution;
        config.validate()?;
        Ok(config)
    }

    /// Search upward from `start_dir` for `.limbform/config.toml`.
    ///
    /// The search stops at a repository root (`.git`, `.hg`, `.svn`) or the
    /// filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir
                .join(defaults::DIR_NAME)
                .join(defaults::CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                return None;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => return None,
            }
        }
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))
    }
}
