//! Session store
//!
//! `session.json` in the state directory carries the latest description,
//! model prompt and model URL between CLI invocations. Writes are atomic and
//! last-write-wins; there is no locking.

use camino::{Utf8Path, Utf8PathBuf};
use limbform_utils::atomic_write::write_file_atomic;
use limbform_utils::error::StateError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const SESSION_FILE_NAME: &str = "session.json";

/// Persisted flow results. Each field is overwritten on the next successful
/// generation of that value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosthetic_model_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosthetic_model_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosthetic_model_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Utf8PathBuf,
}

impl SessionStore {
    /// Store at `<state_dir>/session.json`
    ///
    /// # Errors
    ///
    /// `StateError::Io` if the directory path is not valid UTF-8.
    pub fn in_dir(state_dir: &Path) -> Result<Self, StateError> {
        let dir = Utf8Path::from_path(state_dir).ok_or_else(|| StateError::Io {
            path: state_dir.display().to_string(),
            reason: "state directory path is not valid UTF-8".to_string(),
        })?;
        Ok(Self {
            path: dir.join(SESSION_FILE_NAME),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read the session; a missing file is an empty session
    pub fn load(&self) -> Result<SessionState, StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionState::default());
            }
            Err(e) => {
                return Err(StateError::Io {
                    path: self.path.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
            path: self.path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, state: &SessionState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state).map_err(|e| StateError::Corrupt {
            path: self.path.to_string(),
            reason: e.to_string(),
        })?;
        write_file_atomic(&self.path, &json).map_err(|e| StateError::Io {
            path: self.path.to_string(),
            reason: format!("{e:#}"),
        })?;
        debug!(path = %self.path, "Session saved");
        Ok(())
    }

    /// Load, apply `change`, save
    pub fn update(&self, change: impl FnOnce(&mut SessionState)) -> Result<SessionState, StateError> {
        let mut state = self.load()?;
        change(&mut state);
        self.save(&state)?;
        Ok(state)
    }
}
