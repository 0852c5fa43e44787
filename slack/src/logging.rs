//! Logging setup.
//!
//! Everything goes to stderr; stdout belongs to the plugin host. Filtering
//! follows `RUST_LOG` and defaults to `info`.

use tracing::Span;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const PROVIDER_NAME: &str = "slack";

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging() -> bool {
    init_logging_with_default("info")
}

pub fn init_logging_with_default(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

/// Span tagging every event with the provider's identity
pub fn provider_span(version: &str, commit: &str) -> Span {
    tracing::info_span!(
        "provider",
        provider = PROVIDER_NAME,
        version = version,
        commit = commit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused() {
        init_logging_with_default("debug");
        assert!(!init_logging());
    }

    #[test]
    fn provider_span_can_be_entered() {
        let span = provider_span("0.1.0", "dev");
        let _guard = span.enter();
        tracing::info!("inside provider span");
    }
}
