//! Diagnostic tracing for the harness binaries.
//!
//! Reports, entry listings and streamed entry output go to stdout; tracing
//! only ever writes to stderr, so `RUST_LOG` never changes product output.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, first thing in `main`.
///
/// ```bash
/// RUST_LOG=conform=debug conform check --entry hello
/// ```
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Directives from `RUST_LOG`, `warn` when unset. Malformed directives are
/// dropped instead of disabling the whole filter.
fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy()
}
