//! Tracing/logging initialization for fixture-driven test suites.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a test binary.
///
/// Compact output through the test writer so logs land with the owning
/// test's captured output, filter configurable via `RUST_LOG` (default
/// `info`). Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}
