//! Typed orchestrator<->interop messages for maestro.
//!
//! This crate defines the message catalog exchanged between the coordinator,
//! the interop agent running inside each loaded broadcaster page, and the
//! secondary display surface.

mod commands;
mod endpoint;
mod error;
mod events;
mod state;
mod types;

pub use commands::{AgentCommand, CoordinatorCommand, MenuAction};
pub use endpoint::{agent_link, AgentEndpoint, AgentLink, BroadcasterQuery};
pub use error::IpcError;
pub use events::{AgentEnvelope, AgentEvent, DisplayEvent};
pub use state::{AgentState, CoordinatorState, SwitchPhase};
pub use types::{
    Bounds, Capabilities, ControlCommand, PlaybackStatus, PlayerState,
    DEFAULT_FULL_PLAYER_BOUNDS, DEFAULT_MINI_PLAYER_BOUNDS,
};

use crossbeam_channel::{Receiver, Sender};

/// Result type for IPC operations.
pub type IpcResult<T> = Result<T, IpcError>;

/// Channel capacity for commands into the coordinator.
pub const COORDINATOR_COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Channel capacity for commands to one agent.
pub const AGENT_COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Channel capacity for agent events (agent → coordinator).
pub const AGENT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Channel capacity for broadcaster id queries.
pub const QUERY_CHANNEL_CAPACITY: usize = 4;

/// Channel capacity for display events (coordinator → display surface).
pub const DISPLAY_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded coordinator command channel.
pub fn coordinator_command_channel() -> (Sender<CoordinatorCommand>, Receiver<CoordinatorCommand>)
{
    crossbeam_channel::bounded(COORDINATOR_COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded agent event channel.
pub fn agent_event_channel() -> (Sender<AgentEnvelope>, Receiver<AgentEnvelope>) {
    crossbeam_channel::bounded(AGENT_EVENT_CHANNEL_CAPACITY)
}

/// Creates a bounded broadcaster query channel.
pub fn query_channel() -> (Sender<BroadcasterQuery>, Receiver<BroadcasterQuery>) {
    crossbeam_channel::bounded(QUERY_CHANNEL_CAPACITY)
}

/// Creates a bounded display event channel.
pub fn display_channel() -> (Sender<DisplayEvent>, Receiver<DisplayEvent>) {
    crossbeam_channel::bounded(DISPLAY_EVENT_CHANNEL_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_match_catalog() {
        let command = serde_json::to_value(AgentCommand::MediaControl(ControlCommand::PlayPause))
            .unwrap();
        assert_eq!(
            command,
            serde_json::json!({ "command": "media-control", "payload": "play-pause" })
        );

        let shutdown = serde_json::to_value(AgentCommand::ShutdownInterop("siriusxm".into()))
            .unwrap();
        assert_eq!(shutdown["command"], "shutdown-interop");

        let ack = serde_json::to_value(AgentEvent::InteropShutdownComplete).unwrap();
        assert_eq!(ack["command"], "interop-shutdown-complete");

        let update =
            serde_json::to_value(AgentEvent::PlayerStatusUpdate(PlayerState::default())).unwrap();
        assert_eq!(update["command"], "player-status-update");

        let display = serde_json::to_value(DisplayEvent::SetBroadcaster("siriusxm".into())).unwrap();
        assert_eq!(
            display,
            serde_json::json!({ "command": "set-broadcaster", "payload": "siriusxm" })
        );
    }
}
