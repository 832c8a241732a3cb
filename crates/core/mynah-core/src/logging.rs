//! Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global logging system
///
/// `RUST_LOG` takes precedence; otherwise `MYNAH_LOG_LEVEL` (default `info`)
/// sets the base level. Output goes to stderr. Intended to be called once by
/// the host process before any bot component starts.
pub fn init_logging() {
    let level = std::env::var("MYNAH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging, ignoring a second call
///
/// Test helper: integration tests may race to install the subscriber, and
/// only the first install can win.
pub fn try_init_logging() -> bool {
    let level = std::env::var("MYNAH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
