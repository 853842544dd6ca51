//! Tracing setup for the operator binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Builds the filter for `level`; a valid `RUST_LOG` takes precedence.
pub fn env_filter(level: &str) -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

/// Installs a stderr subscriber at the configured level.
///
/// Installing twice is a no-op; the first subscriber stays in place.
pub fn init_tracing_with_level(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
