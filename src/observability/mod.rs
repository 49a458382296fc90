// src/observability/mod.rs
//! Diagnostics initialization
//!
//! All diagnostics go to stderr: the monitored process's stdout may carry
//! its own protocol traffic and must stay untouched. The debug flag gates
//! the verbose per-call lines; configuration warnings are always visible.
//! `RUST_LOG` overrides both.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber. Safe to call more than once; later
/// calls are no-ops, matching the engine's idempotent installation.
pub fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "bloom_intercept=debug"
    } else {
        "bloom_intercept=warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
