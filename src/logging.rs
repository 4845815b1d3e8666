//! Opt-in tracing setup for binaries using this crate.
//!
//! The library itself only emits `tracing` events; nothing is printed until
//! the application installs a subscriber, either its own or this one.

use crate::error::{Result, TmdbError};
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG`, falling back to `default_directive`
pub fn env_filter(default_directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| TmdbError::InvalidConfig(format!("log filter: {e}")))
}

/// Install a process-wide fmt subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive)?)
        .with_target(true)
        .try_init()
        .map_err(|e| TmdbError::InvalidConfig(format!("tracing init: {e}")))
}
