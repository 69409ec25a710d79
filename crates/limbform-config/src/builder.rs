use std::path::PathBuf;

use limbform_utils::error::ConfigError;

use super::{Config, ConfigSource};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when embedding limbform or in tests, where discovery from the
    /// working directory and environment is unwanted.
    ///
    /// ```rust
    /// use limbform_config::Config;
    ///
    /// let config = Config::builder()
    ///     .description_base_url("http://127.0.0.1:8080/v1/chat/completions")
    ///     .recipient_email("maker@example.com")
    ///     .sender_email("studio@example.com")
    ///     .build()
    ///     .expect("valid config");
    /// assert_eq!(config.notify.recipient_email.as_deref(), Some("maker@example.com"));
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// All values set via the builder are attributed to
/// `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
    set_keys: Vec<&'static str>,
}

macro_rules! setter {
    ($(#[$meta:meta])* $name:ident, $section:ident . $field:ident, $key:literal, String) => {
        $(#[$meta])*
        #[must_use]
        pub fn $name(mut self, value: impl Into<String>) -> Self {
            self.config.$section.$field = Some(value.into());
            self.set_keys.push($key);
            self
        }
    };
    ($(#[$meta:meta])* $name:ident, $section:ident . $field:ident, $key:literal, $ty:ty) => {
        $(#[$meta])*
        #[must_use]
        pub fn $name(mut self, value: $ty) -> Self {
            self.config.$section.$field = Some(value);
            self.set_keys.push($key);
            self
        }
    };
}

impl ConfigBuilder {
    /// Create a new `ConfigBuilder` with no values set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    setter!(
        /// Text-generation endpoint
        description_base_url, description.base_url, "description.base_url", String);
    setter!(description_model, description.model, "description.model", String);
    setter!(description_max_tokens, description.max_tokens, "description.max_tokens", u32);
    setter!(description_temperature, description.temperature, "description.temperature", f32);
    setter!(
        /// Environment variable holding the text-generation API key
        description_api_key_env, description.api_key_env, "description.api_key_env", String);

    setter!(
        /// Synchronous actor endpoint for 3-D generation
        model_actor_url, model.actor_url, "model.actor_url", String);
    setter!(model_api_key_env, model.api_key_env, "model.api_key_env", String);
    setter!(model_headed, model.headed, "model.headed", bool);
    setter!(
        /// Model shown when the generated file cannot be loaded
        model_fallback_url, model.fallback_url, "model.fallback_url", String);

    setter!(notify_base_url, notify.base_url, "notify.base_url", String);
    setter!(notify_model, notify.model, "notify.model", String);
    setter!(notify_api_key_env, notify.api_key_env, "notify.api_key_env", String);
    setter!(sender_email, notify.sender_email, "notify.sender_email", String);
    setter!(recipient_email, notify.recipient_email, "notify.recipient_email", String);
    setter!(notify_tool, notify.tool, "notify.tool", String);
    setter!(
        /// Substrings that mark a URL as an authorization link
        auth_url_markers, notify.auth_url_markers, "notify.auth_url_markers", Vec<String>);

    setter!(timeout_secs, http.timeout_secs, "http.timeout_secs", u64);
    setter!(connect_timeout_secs, http.connect_timeout_secs, "http.connect_timeout_secs", u64);

    /// Directory for the session store
    #[must_use]
    pub fn state_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.state.dir = Some(path.into());
        self.set_keys.push("state.dir");
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value fails validation.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut config = self.config;
        for key in self.set_keys {
            config
                .source_attribution
                .insert(key.to_string(), ConfigSource::Programmatic);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_attributes_programmatic_source() {
        let config = Config::builder()
            .description_model("gpt-4.1-mini")
            .timeout_secs(120)
            .build()
            .unwrap();

        assert_eq!(config.description.model.as_deref(), Some("gpt-4.1-mini"));
        assert_eq!(config.http.timeout_secs, Some(120));
        assert_eq!(
            config.source_attribution.get("http.timeout_secs"),
            Some(&ConfigSource::Programmatic)
        );
        assert!(!config.source_attribution.contains_key("notify.model"));
    }

    #[test]
    fn test_builder_validates() {
        let result = Config::builder().recipient_email("not-an-email").build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
