//! Coordinator timing configuration.

use std::time::Duration;

/// Timing for the coordinator loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// How long a switch waits for the old agent to acknowledge shutdown
    /// before loading the new broadcaster anyway.
    pub handshake_timeout: Duration,

    /// Quiet period before a window bounds change is persisted.
    pub bounds_debounce: Duration,

    /// Upper bound on how long the loop sleeps with nothing to do.
    pub idle_wakeup: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(5),
            bounds_debounce: Duration::from_millis(500),
            idle_wakeup: Duration::from_millis(250),
        }
    }
}
