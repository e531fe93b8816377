//! Tracing setup shared by every CareTrack entry point.
//!
//! Store degradation (corrupt or missing tables) is reported through
//! `tracing::warn!` rather than stderr, so the subscriber installed here
//! is the only place those events become visible.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the default subscriber at INFO level.
///
/// `RUST_LOG` overrides the level when set.
pub fn init() {
    init_with_level("info")
}

/// Install the subscriber with an explicit default level ("debug", "info",
/// "warn", "error"). `RUST_LOG` still wins when present.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Route log output through the test harness so warnings emitted by
/// degraded-table loads show up in failing test output.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
