//! Commands sent into the coordinator and on to the interop agent.

use serde::{Deserialize, Serialize};

use crate::types::{Bounds, ControlCommand};

/// Commands the coordinator sends to the interop agent of the loaded page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "kebab-case")]
pub enum AgentCommand {
    /// Apply a control to the active broadcaster.
    MediaControl(ControlCommand),

    /// Begin shutting down. Carries the id of the broadcaster being
    /// switched to, for logging only.
    ShutdownInterop(String),
}

/// Commands that the menu, media keys and display surface send to the
/// coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoordinatorCommand {
    /// Switch the active broadcaster.
    SelectBroadcaster(String),

    /// Route a control to the active broadcaster.
    Control(ControlCommand),

    /// A menu item was activated.
    Menu(MenuAction),

    /// A player window was moved or resized.
    WindowBoundsChanged {
        /// Whether the change came from the mini player window.
        mini: bool,

        /// New content bounds.
        bounds: Bounds,
    },

    /// A headline capability could not be set up.
    CapabilityUnavailable {
        /// Reason to show to the user.
        message: String,
    },

    /// The content surface finished a page load it reported as in flight.
    PageLoaded {
        /// Session of the agent link handed to that load.
        session: u64,

        /// Why the load failed, if it did.
        error: Option<String>,
    },

    /// Stop the coordinator loop.
    Shutdown,
}

/// Actions bound to application menu items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAction {
    PlayPause,
    PreviousTrack,
    NextTrack,
    ToggleMiniPlayer,
    PreviousPage,
    NextPage,
    About,
    Preferences,
    SelectBroadcaster(String),
}

impl MenuAction {
    /// Returns the control command this action maps to, if any.
    pub fn control(&self) -> Option<ControlCommand> {
        match self {
            Self::PlayPause => Some(ControlCommand::PlayPause),
            Self::PreviousTrack => Some(ControlCommand::PreviousTrack),
            Self::NextTrack => Some(ControlCommand::NextTrack),
            _ => None,
        }
    }
}
