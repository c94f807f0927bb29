//! Tracing setup for host applications and examples.

use tracing_subscriber::EnvFilter;

/// Initialize a global `tracing` subscriber. The filter honors
/// `RUST_LOG`, defaulting to `info` for this crate. Safe to call once;
/// subsequent calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crewboard=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
