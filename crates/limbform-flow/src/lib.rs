//! Design flow orchestration
//!
//! [`DesignFlow`] drives the preference → description → model → email/view
//! sequence over the service traits from `limbform-clients`, tracks the
//! stage and progress index, guards each step against re-entry, and keeps
//! user-visible notices. [`SessionStore`] persists results between runs.

mod flow;
mod guard;
mod notices;
mod session;
mod stage;

#[cfg(test)]
mod tests;

pub use flow::{DesignFlow, FlowSnapshot, PendingAuthorization};
pub use notices::{Notice, NoticeLevel};
pub use session::{SESSION_FILE_NAME, SessionState, SessionStore};
pub use stage::FlowStage;
