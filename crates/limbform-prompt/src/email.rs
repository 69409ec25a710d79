//! Email text for the manufacturer notification
//!
//! The email service is driven by a natural-language instruction, so the
//! subject and body are embedded in a single prompt naming the recipient and
//! the one tool the service may use.

/// Subject and body of the manufacturer email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

const SUBJECT: &str = "New custom prosthetic leg cover design: 3D model ready";

/// Draft the manufacturer email for a generated model
#[must_use]
pub fn draft_email(model_url: &str, description: Option<&str>) -> EmailDraft {
    let mut body = String::from(
        "Hello,\n\nA new custom prosthetic leg cover design is ready for manufacturing review.\n\n",
    );
    body.push_str(&format!("3D model file: {model_url}\n"));
    if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
        body.push_str(&format!("\nDesign description:\n{description}\n"));
    }
    body.push_str("\nPlease reply with a production estimate.\n\nThank you.");

    EmailDraft {
        subject: SUBJECT.to_string(),
        body,
    }
}

/// Wrap a draft in the instruction sent to the email orchestration service
#[must_use]
pub fn build_email_instruction(draft: &EmailDraft, recipient: &str, tool: &str) -> String {
    format!(
        "Send an email to {recipient} using the {tool} tool. Do not use any other tool.\n\
         Subject: {subject}\n\
         Body:\n{body}",
        subject = draft.subject,
        body = draft.body,
    )
}
