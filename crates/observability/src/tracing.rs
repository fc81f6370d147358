//! Tracing subscriber wiring.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber: JSON lines on stdout, filtered by
/// `RUST_LOG` (default `info`).
///
/// Later calls are no-ops, so the server binary and tests can both call this.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Targets stay on: the module path tells cart noise from backend noise.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .try_init();
}
