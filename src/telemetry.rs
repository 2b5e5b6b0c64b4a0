//! Tracing initialization for embedding binaries and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber with `RUST_LOG` filtering.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
