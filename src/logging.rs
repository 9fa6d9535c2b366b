//! Log output for the binary. Library code only emits `tracing` events.
//!
//! The filter comes from `RUST_LOG` (e.g. `RUST_LOG=gantt_scheduler=debug`)
//! and defaults to `info`.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
