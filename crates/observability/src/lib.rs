//! Shared logging setup for the storefront binaries.

/// Tracing configuration (filter, output format).
pub mod tracing;

/// Initialize process-wide logging.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    tracing::init();
}
