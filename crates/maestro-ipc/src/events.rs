//! Events sent from the interop agent and from the coordinator.

use serde::{Deserialize, Serialize};

use crate::types::PlayerState;

/// Events the interop agent sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "kebab-case")]
pub enum AgentEvent {
    /// Shutdown handshake acknowledgment. Sent exactly once per agent.
    InteropShutdownComplete,

    /// Snapshot pushed on every poll tick.
    PlayerStatusUpdate(PlayerState),
}

/// An agent event tagged with the session of the agent that sent it.
///
/// Every page load gets a fresh session number; the coordinator drops
/// envelopes from any session other than the one currently bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEnvelope {
    /// Session of the sending agent.
    pub session: u64,

    /// The event itself.
    pub event: AgentEvent,
}

/// Events the coordinator sends to the secondary display surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "kebab-case")]
pub enum DisplayEvent {
    /// The active broadcaster changed and its page finished loading.
    SetBroadcaster(String),

    /// Relayed agent snapshot, unmodified.
    PlayerStatusUpdate(PlayerState),

    /// Mini player mode was toggled.
    MiniModeChanged(bool),

    /// A headline capability is unavailable.
    Error {
        /// Message to show to the user.
        message: String,
    },
}
