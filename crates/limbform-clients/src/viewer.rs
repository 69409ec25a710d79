//! Model viewer URL resolution
//!
//! Before a model is shown, its URL is probed with a HEAD request. If the
//! generated file cannot be reached, the fallback model is probed once. There
//! is no further retry.

use crate::http_client::{HttpClient, map_status_error};
use async_trait::async_trait;
use limbform_config::Config;
use limbform_utils::error::ClientError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SERVICE: &str = "viewer";

/// The URL a viewer should load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerOutcome {
    pub url: String,
    /// True when the generated model could not be loaded
    pub used_fallback: bool,
}

/// Checks that a model URL can be loaded
#[async_trait]
pub trait ModelProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<(), ClientError>;
}

/// `ModelProbe` that issues a HEAD request
#[derive(Clone)]
pub struct HttpModelProbe {
    client: HttpClient,
}

impl HttpModelProbe {
    pub fn new_from_config(config: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            client: HttpClient::from_config(config)?,
        })
    }
}

#[async_trait]
impl ModelProbe for HttpModelProbe {
    async fn probe(&self, url: &str) -> Result<(), ClientError> {
        let reply = self.client.send(self.client.head(url), SERVICE).await?;
        if reply.status.is_success() {
            Ok(())
        } else {
            Err(map_status_error(reply.status, SERVICE, &reply.body))
        }
    }
}

/// Pick the URL to show: the model itself, else the fallback.
///
/// # Errors
///
/// Returns the fallback's probe error when neither URL loads.
pub async fn resolve_viewable_url(
    probe: &dyn ModelProbe,
    model_url: &str,
    fallback_url: &str,
) -> Result<ViewerOutcome, ClientError> {
    let model_url = model_url.trim();
    let primary = if model_url.is_empty() {
        Err(ClientError::BadRequest("no model URL to load".to_string()))
    } else {
        probe.probe(model_url).await
    };

    match primary {
        Ok(()) => {
            debug!(service = SERVICE, url = %model_url, "Model URL is reachable");
            Ok(ViewerOutcome {
                url: model_url.to_string(),
                used_fallback: false,
            })
        }
        Err(e) => {
            warn!(
                service = SERVICE,
                error = %e,
                fallback = %fallback_url,
                "Model failed to load, trying fallback"
            );
            probe.probe(fallback_url).await?;
            Ok(ViewerOutcome {
                url: fallback_url.to_string(),
                used_fallback: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Probe that succeeds for a fixed set of URLs and records every call
    struct ScriptedProbe {
        reachable: HashSet<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn new(reachable: &[&'static str]) -> Self {
            Self {
                reachable: reachable.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelProbe for ScriptedProbe {
        async fn probe(&self, url: &str) -> Result<(), ClientError> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.reachable.contains(url) {
                Ok(())
            } else {
                Err(ClientError::Transport(format!("{url} unreachable")))
            }
        }
    }

    const MODEL: &str = "https://cdn.example.com/leg.glb";
    const FALLBACK: &str = "https://cdn.example.com/fallback.glb";

    #[tokio::test]
    async fn test_reachable_model_is_used() {
        let probe = ScriptedProbe::new(&[MODEL, FALLBACK]);
        let outcome = resolve_viewable_url(&probe, MODEL, FALLBACK).await.unwrap();
        assert_eq!(
            outcome,
            ViewerOutcome {
                url: MODEL.to_string(),
                used_fallback: false
            }
        );
        assert_eq!(probe.calls(), vec![MODEL.to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_used_once() {
        let probe = ScriptedProbe::new(&[FALLBACK]);
        let outcome = resolve_viewable_url(&probe, MODEL, FALLBACK).await.unwrap();
        assert!(outcome.used_fallback);
        assert_eq!(outcome.url, FALLBACK);
        assert_eq!(probe.calls(), vec![MODEL.to_string(), FALLBACK.to_string()]);
    }

    #[tokio::test]
    async fn test_both_unreachable_is_terminal() {
        let probe = ScriptedProbe::new(&[]);
        let err = resolve_viewable_url(&probe, MODEL, FALLBACK).await.unwrap_err();
        assert!(err.to_string().contains("fallback.glb"));
        assert_eq!(probe.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_model_url_goes_straight_to_fallback() {
        let probe = ScriptedProbe::new(&[FALLBACK]);
        let outcome = resolve_viewable_url(&probe, "  ", FALLBACK).await.unwrap();
        assert!(outcome.used_fallback);
        assert_eq!(probe.calls(), vec![FALLBACK.to_string()]);
    }
}
