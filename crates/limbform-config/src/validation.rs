use limbform_utils::error::ConfigError;

use super::Config;

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

fn check_url(key: &str, url: Option<&str>) -> Result<(), ConfigError> {
    if let Some(url) = url
        && !(url.starts_with("https://") || url.starts_with("http://"))
    {
        return Err(invalid(key, format!("'{url}' must be an http(s) URL")));
    }
    Ok(())
}

fn check_email(key: &str, email: Option<&str>) -> Result<(), ConfigError> {
    if let Some(email) = email {
        let trimmed = email.trim();
        let valid = trimmed
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(invalid(key, format!("'{email}' is not an email address")));
        }
    }
    Ok(())
}

fn check_env_name(key: &str, name: Option<&str>) -> Result<(), ConfigError> {
    if let Some(name) = name
        && (name.is_empty() || name.contains('='))
    {
        return Err(invalid(key, "must be a non-empty environment variable name"));
    }
    Ok(())
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_url("description.base_url", self.description.base_url.as_deref())?;
        check_url("model.actor_url", self.model.actor_url.as_deref())?;
        check_url("model.fallback_url", self.model.fallback_url.as_deref())?;
        check_url("notify.base_url", self.notify.base_url.as_deref())?;

        check_env_name("description.api_key_env", self.description.api_key_env.as_deref())?;
        check_env_name("model.api_key_env", self.model.api_key_env.as_deref())?;
        check_env_name("notify.api_key_env", self.notify.api_key_env.as_deref())?;

        check_email("notify.sender_email", self.notify.sender_email.as_deref())?;
        check_email("notify.recipient_email", self.notify.recipient_email.as_deref())?;

        if let Some(temperature) = self.description.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(invalid(
                "description.temperature",
                "must be between 0.0 and 2.0",
            ));
        }

        if let Some(max_tokens) = self.description.max_tokens {
            if max_tokens == 0 {
                return Err(invalid("description.max_tokens", "must be greater than 0"));
            }
            if max_tokens > 32_768 {
                return Err(invalid(
                    "description.max_tokens",
                    "exceeds maximum limit of 32768",
                ));
            }
        }

        if self.http.timeout_secs == Some(0) {
            return Err(invalid("http.timeout_secs", "must be at least 1 second"));
        }
        if self.http.connect_timeout_secs == Some(0) {
            return Err(invalid(
                "http.connect_timeout_secs",
                "must be at least 1 second",
            ));
        }

        if let Some(tool) = &self.notify.tool
            && tool.trim().is_empty()
        {
            return Err(invalid("notify.tool", "must not be empty"));
        }

        if let Some(markers) = &self.notify.auth_url_markers {
            if markers.is_empty() {
                return Err(invalid(
                    "notify.auth_url_markers",
                    "must list at least one marker",
                ));
            }
            if markers.iter().any(|m| m.trim().is_empty()) {
                return Err(invalid(
                    "notify.auth_url_markers",
                    "markers must not be empty strings",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(err: ConfigError) -> String {
        match err {
            ConfigError::InvalidValue { key, .. } => key,
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::minimal_for_testing().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut config = Config::default();
        config.model.actor_url = Some("ftp://actors.example.com/run".to_string());
        assert_eq!(key_of(config.validate().unwrap_err()), "model.actor_url");
    }

    #[test]
    fn test_rejects_bad_email() {
        let mut config = Config::default();
        config.notify.recipient_email = Some("maker.example.com".to_string());
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "notify.recipient_email"
        );

        config.notify.recipient_email = Some("@example.com".to_string());
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "notify.recipient_email"
        );
    }

    #[test]
    fn test_rejects_out_of_range_numbers() {
        let mut config = Config::default();
        config.description.temperature = Some(2.5);
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "description.temperature"
        );

        let mut config = Config::default();
        config.description.max_tokens = Some(0);
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "description.max_tokens"
        );

        let mut config = Config::default();
        config.http.timeout_secs = Some(0);
        assert_eq!(key_of(config.validate().unwrap_err()), "http.timeout_secs");
    }

    #[test]
    fn test_rejects_empty_marker_list() {
        let mut config = Config::default();
        config.notify.auth_url_markers = Some(vec![]);
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "notify.auth_url_markers"
        );
    }
}
