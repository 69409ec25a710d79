//! Structured logging setup
//!
//! All diagnostic output goes to stderr through `tracing`; stdout is reserved
//! for command results so `--json` output stays machine-readable.

use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Check if colored output should be used.
///
/// Returns true only if stderr is a terminal and `NO_COLOR` is not set.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Default filter directive when `RUST_LOG` is not set
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "limbform=debug,info"
    } else {
        "limbform=info,warn"
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the built-in filter. Calling this twice returns an
/// error from the second call and leaves the first subscriber in place.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_color())
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
