//! Agent timing configuration.

use std::time::Duration;

/// Default interval between state polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default bound on the boot-time broadcaster query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Timing for one interop agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// Interval between state polls.
    pub poll_interval: Duration,

    /// How long boot waits for the coordinator to name the bound
    /// broadcaster.
    pub query_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}
