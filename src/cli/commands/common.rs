//! Helpers shared by the command handlers

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufRead, IsTerminal, Write};
use tracing::{info, warn};

use crate::{DesignFlow, EmailOutcome, ExitCode, LimbformError, NoticeLevel};

/// Print pretty JSON on stdout
pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{json}");
    Ok(())
}

fn notice_icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "ℹ",
        NoticeLevel::Success => "✓",
        NoticeLevel::Warning => "⚠",
        NoticeLevel::Error => "✗",
    }
}

/// Drain the flow's notices to stderr.
///
/// Error notices are skipped; the failing step's error is reported by
/// `run()` with suggestions.
pub fn print_notices(flow: &DesignFlow) {
    for notice in flow.drain_notices() {
        if notice.level != NoticeLevel::Error {
            eprintln!("{} {}", notice_icon(notice.level), notice.text);
        }
    }
}

pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Ask on stderr and read one line from stdin; `None` on end of input
pub fn prompt_line(question: &str) -> Result<Option<String>> {
    eprint!("{question}");
    std::io::stderr().flush().context("Failed to flush stderr")?;

    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Open `url` in the system browser; failure is logged, not fatal
pub fn open_in_browser(url: &str) {
    match webbrowser::open(url) {
        Ok(()) => info!(url, "Opened in browser"),
        Err(e) => warn!(url, error = %e, "Could not open browser"),
    }
}

/// Send the model link, walking the user through authorization.
///
/// On `AuthorizationRequired` the link is shown (and opened with
/// `browser`), and each confirmation re-issues the identical call. Declining,
/// or having no terminal to confirm on, ends with `AUTH_REQUIRED`.
pub async fn deliver_email(
    flow: &DesignFlow,
    browser: bool,
    json: bool,
) -> Result<(EmailOutcome, ExitCode)> {
    let mut outcome = flow.send_email().await.map_err(LimbformError::from)?;

    loop {
        let EmailOutcome::AuthorizationRequired { auth_url, message } = &outcome else {
            if !json {
                print_notices(flow);
            }
            return Ok((outcome, ExitCode::SUCCESS));
        };

        if !json {
            print_notices(flow);
            eprintln!("  {message}");
        }
        if browser {
            open_in_browser(auth_url);
        }
        if json || !stdin_is_interactive() {
            if !json {
                eprintln!("  Run `limbform email` again after authorizing.");
            }
            return Ok((outcome, ExitCode::AUTH_REQUIRED));
        }

        let answer = prompt_line("Press Enter after authorizing to retry, or type 'skip': ")?;
        match answer.as_deref() {
            None | Some("skip") | Some("s") | Some("q") => {
                return Ok((outcome, ExitCode::AUTH_REQUIRED));
            }
            Some(_) => {
                outcome = flow.retry_email().await.map_err(LimbformError::from)?;
            }
        }
    }
}
