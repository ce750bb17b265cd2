//! Tracing subscriber setup shared by both binaries.
//!
//! Logs go to stderr. stdout belongs to the supervisor-facing output (echo
//! lines, usage banner, final status line).

use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

/// Initialize the tracing subscriber with the specified log format.
///
/// - `LogFormat::Text`: human-readable lines
/// - `LogFormat::Json`: one JSON object per event for log aggregation
///
/// The level comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .with_env_filter(filter)
                .init();
        }
    }
}
