//! Tracing subscriber setup for binaries embedding Skein.
//!
//! The library crates only emit events; nothing is printed until a binary
//! installs a subscriber.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `SKEIN_LOG=skein_graph=debug`.
pub const LOG_ENV: &str = "SKEIN_LOG";

const DEFAULT_FILTER: &str = "skein=info,skein_graph=info,skein_rag=info";

/// Install a fmt subscriber filtered by `SKEIN_LOG`, falling back to info
/// level for the skein crates. Returns `false` if a global subscriber was
/// already set.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    init_with_filter(filter)
}

/// Install a fmt subscriber with an explicit filter string.
pub fn init_tracing_with_filter(filter: &str) -> bool {
    init_with_filter(EnvFilter::new(filter))
}

fn init_with_filter(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
