//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Logs go to stderr so stdout carries only the rendered result.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("oracle_submit={default_level},warn").into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        // Already installed (tests, embedding); keep the existing one.
        tracing::debug!(error = %e, "Tracing subscriber already set");
    }
}
