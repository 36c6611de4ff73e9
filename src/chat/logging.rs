//! Log output for the chat binary.
//!
//! Library events go to stderr so they never interleave with a streaming reply on stdout.
//! `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=weather_chat=debug` shows discarded
//! stream records.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Build the filter from a `RUST_LOG`-style directive.
pub fn log_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber for the chat binary.
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging(use_color: bool) {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directive.as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .try_init();
}
