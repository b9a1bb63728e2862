//! Tracing subscriber initialisation.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber from `RUST_LOG`.
/// Defaults to `info` when the variable is unset.
pub fn init() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
