//! Agent and coordinator state machine types.

use serde::{Deserialize, Serialize};

/// Lifecycle of one interop agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// Resolving the bound broadcaster.
    #[default]
    Init,

    /// Poll timer running.
    Polling,

    /// Pausing playback and cancelling the poll timer.
    ShuttingDown,

    /// Inert. A fresh agent is created by the next page load.
    Terminated,
}

impl AgentState {
    /// Returns true while the poll loop is active.
    pub fn is_polling(self) -> bool {
        matches!(self, Self::Polling)
    }

    /// Returns true once shutdown has begun or finished.
    pub fn is_shut_down(self) -> bool {
        matches!(self, Self::ShuttingDown | Self::Terminated)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Polling => "Polling",
            Self::ShuttingDown => "ShuttingDown",
            Self::Terminated => "Terminated",
        }
    }
}

/// Phases of a broadcaster switch, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchPhase {
    /// Shutdown signal sent, waiting for the acknowledgment.
    AwaitingShutdown,

    /// Configuring and loading the new broadcaster page.
    Loading,
}

/// The state of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorState {
    /// No page loaded yet.
    #[default]
    Idle,

    /// A broadcaster page is loaded.
    Active {
        /// Active broadcaster id.
        broadcaster: String,
    },

    /// Switching to another broadcaster.
    Switching {
        /// Broadcaster being switched to.
        target: String,

        /// Current phase.
        phase: SwitchPhase,
    },
}

impl CoordinatorState {
    /// Returns true while a switch handshake is in flight.
    pub fn is_switching(&self) -> bool {
        matches!(self, Self::Switching { .. })
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Active { .. } => "Active",
            Self::Switching { .. } => "Switching",
        }
    }
}
