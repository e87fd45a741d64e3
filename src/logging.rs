//! Tracing subscriber setup for the `scout` binary.
//!
//! The filter comes from `RUST_LOG` and defaults to `info`. Output goes
//! to stderr so CLI results on stdout stay clean.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (e.g. from tests) is harmless.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
