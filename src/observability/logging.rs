//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from the environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - RUST_LOG wins; otherwise `haproxy_discovery=<default_level>`
//! - Writes to stderr so CLI output on stdout stays parseable

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("haproxy_discovery={}", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
