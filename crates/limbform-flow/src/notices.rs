//! Transient, dismissible user messages

use chrono::{DateTime, Utc};
use limbform_utils::types::FlowStep;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One message shown to the user until dismissed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Unique within a flow, increasing in creation order
    pub id: u64,
    pub level: NoticeLevel,
    pub step: Option<FlowStep>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct NoticeBoard {
    next_id: u64,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn push(&mut self, level: NoticeLevel, step: Option<FlowStep>, text: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.notices.push(Notice {
            id,
            level,
            step,
            text: text.into(),
            created_at: Utc::now(),
        });
        id
    }

    /// Remove a notice; returns false if it was already gone
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn active(&self) -> Vec<Notice> {
        self.notices.clone()
    }

    pub fn take_all(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
