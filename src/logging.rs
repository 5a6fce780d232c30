//! # Structured Logging
//!
//! Console logging setup for standalone use of the engine (tests, benches,
//! host tools without their own subscriber). An embedding tool that installs
//! its own global subscriber wins: initialization here uses `try_init` and is
//! a no-op when a subscriber already exists.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Environment variable controlling the log filter, e.g. `DEBOUNCE_LOG=debug`.
pub const LOG_ENV_VAR: &str = "DEBOUNCE_LOG";

/// Initialize console logging with an environment-derived filter.
///
/// Safe to call from multiple threads and multiple times; only the first call
/// does any work.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

        let initialized = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init();

        if initialized.is_err() {
            // A global subscriber is already set by the host. Not an error.
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}
