//! Tracing subscriber setup for hosts embedding the core.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `neuracare_core=debug`).
pub const LOG_ENV: &str = "NEURACARE_LOG";

/// Install a fmt subscriber filtered by `NEURACARE_LOG`, or `default_filter`
/// when unset or invalid.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is left in place.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
