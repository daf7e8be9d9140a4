//! Diagnostic tracing for culprit sessions.
//!
//! Tracing goes to stderr and is silent below `warn` unless `RUST_LOG` asks
//! for more. The operator-facing conversation (questions, probe listings and
//! the final verdict) is written to stdout by `io::render` and `io::oracle`,
//! so piping answers in and reading results out never mixes with log lines.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber.
///
/// ```bash
/// RUST_LOG=culprit=debug culprit search
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).without_time().compact())
        .init();
}
