use serde::Serialize;
use std::collections::BTreeMap;

use super::{Config, ConfigSource, defaults};

/// A resolved setting and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveValue {
    pub value: String,
    pub source: ConfigSource,
}

impl Config {
    /// Every setting with defaults applied, keyed by `section.field`.
    ///
    /// Unset optional values (no default) are omitted. Secrets never appear
    /// here; only the names of the environment variables that hold them.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, EffectiveValue> {
        let mut out = BTreeMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                let source = self
                    .source_attribution
                    .get(key)
                    .copied()
                    .unwrap_or(ConfigSource::Default);
                out.insert(key.to_string(), EffectiveValue { value, source });
            }
        };

        let d = &self.description;
        put(
            "description.base_url",
            Some(or_default(&d.base_url, defaults::DESCRIPTION_BASE_URL)),
        );
        put(
            "description.model",
            Some(or_default(&d.model, defaults::DESCRIPTION_MODEL)),
        );
        put(
            "description.max_tokens",
            Some(d.max_tokens.unwrap_or(defaults::DESCRIPTION_MAX_TOKENS).to_string()),
        );
        put(
            "description.temperature",
            Some(d.temperature.unwrap_or(defaults::DESCRIPTION_TEMPERATURE).to_string()),
        );
        put(
            "description.api_key_env",
            Some(or_default(&d.api_key_env, defaults::DESCRIPTION_API_KEY_ENV)),
        );

        let m = &self.model;
        put(
            "model.actor_url",
            Some(or_default(&m.actor_url, defaults::MODEL_ACTOR_URL)),
        );
        put(
            "model.api_key_env",
            Some(or_default(&m.api_key_env, defaults::MODEL_API_KEY_ENV)),
        );
        put(
            "model.headed",
            Some(m.headed.unwrap_or(defaults::MODEL_HEADED).to_string()),
        );
        put(
            "model.fallback_url",
            Some(or_default(&m.fallback_url, defaults::MODEL_FALLBACK_URL)),
        );

        let n = &self.notify;
        put(
            "notify.base_url",
            Some(or_default(&n.base_url, defaults::NOTIFY_BASE_URL)),
        );
        put("notify.model", Some(or_default(&n.model, defaults::NOTIFY_MODEL)));
        put(
            "notify.api_key_env",
            Some(or_default(&n.api_key_env, defaults::NOTIFY_API_KEY_ENV)),
        );
        put("notify.sender_email", n.sender_email.clone());
        put("notify.recipient_email", n.recipient_email.clone());
        put("notify.tool", Some(or_default(&n.tool, defaults::NOTIFY_TOOL)));
        put(
            "notify.auth_url_markers",
            Some(n.auth_url_markers_or_default().join(", ")),
        );

        put("http.timeout_secs", self.http.timeout_secs.map(|t| t.to_string()));
        put(
            "http.connect_timeout_secs",
            Some(self.connect_timeout_secs().to_string()),
        );

        put("state.dir", Some(self.state_dir().display().to_string()));

        out
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}
