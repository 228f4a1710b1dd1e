//! Tracing subscriber setup for the runtime binary.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// Filter directives come from `IGNITION_LOG_LEVEL`, defaulting to `info`.
/// Call once from `main`; a second call panics the same way two subscribers
/// would, so tests use their own subscribers.
pub fn init() {
    let filter = EnvFilter::try_from_env("IGNITION_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
