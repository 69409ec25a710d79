//! Prompt formatting
//!
//! Two prompts are built per design: the description prompt from the user's
//! selection, and the model prompt derived from the generated description.
//!
//! The model prompt keeps the whole description. An earlier policy cut the
//! description down to its first sentence, which dropped most of the
//! material and finish detail the 3-D service needs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::preferences::PreferenceSelection;

/// Opening sentence of every description prompt
pub const DESCRIPTION_INSTRUCTION: &str = "Create a detailed, vivid description of a custom prosthetic leg cover design based on the following preferences:";

/// Qualifier appended to model prompts that do not mention the subject
pub const PROSTHETIC_QUALIFIER: &str = "The design is a cover for a prosthetic leg.";

/// Closing sentence of every model prompt
pub const MODEL_INSTRUCTION: &str = "Create a realistic 3D model of this prosthetic leg cover.";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Build the description prompt from a selection.
///
/// Returns `None` when every field is empty. Callers treat that as a
/// user-input error and must not issue a network call.
#[must_use]
pub fn build_description_prompt(selection: &PreferenceSelection) -> Option<String> {
    let lines: Vec<String> = selection
        .filled()
        .map(|(field, value)| format!("{}: {}", field.label(), value))
        .collect();

    if lines.is_empty() {
        return None;
    }

    Some(format!("{DESCRIPTION_INSTRUCTION}\n{}", lines.join("\n")))
}

/// Reshape a generated description into the prompt for the 3-D service.
///
/// Whitespace runs collapse to single spaces, the prosthetic-leg qualifier is
/// added when the text never mentions one, and the fixed model instruction
/// closes the prompt. The description itself is never truncated.
#[must_use]
pub fn shorten_for_model_prompt(description: &str) -> String {
    let normalized = WHITESPACE.replace_all(description.trim(), " ").into_owned();

    let mut sentences: Vec<String> = Vec::with_capacity(3);
    if !normalized.is_empty() {
        sentences.push(normalized);
    }
    if !sentences
        .iter()
        .any(|s| s.to_lowercase().contains("prosthetic leg"))
    {
        sentences.push(PROSTHETIC_QUALIFIER.to_string());
    }
    sentences.push(MODEL_INSTRUCTION.to_string());

    join_sentences(&sentences)
}

/// Join fragments, adding a period where a fragment lacks closing punctuation
fn join_sentences(parts: &[String]) -> String {
    let mut out = String::new();
    for part in parts {
        if !out.is_empty() {
            if !out.ends_with(['.', '!', '?']) {
                out.push('.');
            }
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}
