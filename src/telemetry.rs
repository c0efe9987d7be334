//! Logging setup.
//!
//! The engine only emits `tracing` events; installing a subscriber is left to
//! the embedding application. These helpers install the same fmt subscriber
//! everywhere, filtered by `RUST_LOG` with `info` as the floor.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
}

/// Install the global fmt subscriber
///
/// Returns `false` if a global subscriber was already installed, so repeated
/// calls are harmless.
pub fn try_init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .is_ok()
}

/// Install a subscriber that writes through the test harness capture
pub fn init_for_tests() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_for_tests();
        assert!(!try_init());
        assert!(!init_for_tests());
    }
}
