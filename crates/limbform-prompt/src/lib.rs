//! Preference model and prompt formatting
//!
//! Everything here is pure string work: no I/O and no configuration. The
//! clients in `limbform-clients` send what these functions build.

mod email;
mod formatter;
mod preferences;

pub use email::{EmailDraft, build_email_instruction, draft_email};
pub use formatter::{
    DESCRIPTION_INSTRUCTION, MODEL_INSTRUCTION, PROSTHETIC_QUALIFIER, build_description_prompt,
    shorten_for_model_prompt,
};
pub use preferences::{PreferenceField, PreferenceSelection};
