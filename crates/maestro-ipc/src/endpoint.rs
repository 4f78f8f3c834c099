//! Per-page links between the coordinator and an interop agent.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::commands::AgentCommand;
use crate::error::IpcError;
use crate::events::{AgentEnvelope, AgentEvent};
use crate::{IpcResult, AGENT_COMMAND_CHANNEL_CAPACITY};

/// Synchronous `get-current-broadcaster` request.
///
/// The coordinator answers with the id of the active broadcaster, or `None`
/// when nothing is selected.
#[derive(Debug)]
pub struct BroadcasterQuery {
    /// Where the answer goes.
    pub reply: Sender<Option<String>>,
}

/// The agent's end of a page link.
#[derive(Debug)]
pub struct AgentEndpoint {
    session: u64,
    commands: Receiver<AgentCommand>,
    events: Sender<AgentEnvelope>,
    queries: Sender<BroadcasterQuery>,
}

impl AgentEndpoint {
    /// Session number of this page load.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Commands from the coordinator.
    pub fn commands(&self) -> &Receiver<AgentCommand> {
        &self.commands
    }

    /// Asks the coordinator which broadcaster is selected, blocking until it
    /// answers or `timeout` elapses.
    pub fn current_broadcaster(&self, timeout: Duration) -> IpcResult<Option<String>> {
        let (reply, answer) = crossbeam_channel::bounded(1);
        self.queries
            .send_timeout(BroadcasterQuery { reply }, timeout)
            .map_err(|_| IpcError::Disconnected)?;

        match answer.recv_timeout(timeout) {
            Ok(id) => Ok(id),
            Err(RecvTimeoutError::Timeout) => Err(IpcError::Timeout("current broadcaster")),
            Err(RecvTimeoutError::Disconnected) => Err(IpcError::Disconnected),
        }
    }

    /// Sends an event, waiting for channel space.
    pub fn send(&self, event: AgentEvent) -> IpcResult<()> {
        self.events
            .send(self.envelope(event))
            .map_err(|_| IpcError::Disconnected)
    }

    /// Sends an event without blocking. Fails with [`IpcError::Full`] when
    /// the coordinator is behind.
    pub fn try_send(&self, event: AgentEvent) -> IpcResult<()> {
        self.events
            .try_send(self.envelope(event))
            .map_err(|e| match e {
                TrySendError::Full(_) => IpcError::Full,
                TrySendError::Disconnected(_) => IpcError::Disconnected,
            })
    }

    fn envelope(&self, event: AgentEvent) -> AgentEnvelope {
        AgentEnvelope {
            session: self.session,
            event,
        }
    }
}

/// The coordinator's end of a page link.
#[derive(Debug, Clone)]
pub struct AgentLink {
    session: u64,
    commands: Sender<AgentCommand>,
}

impl AgentLink {
    /// Session number of this page load.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Sends a command to the agent without blocking.
    pub fn send(&self, command: AgentCommand) -> IpcResult<()> {
        self.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => IpcError::Full,
            TrySendError::Disconnected(_) => IpcError::Disconnected,
        })
    }
}

/// Creates both ends of a link for one page load.
///
/// `events` and `queries` are shared by every agent the coordinator ever
/// boots; only the command channel is private to the session.
pub fn agent_link(
    session: u64,
    events: Sender<AgentEnvelope>,
    queries: Sender<BroadcasterQuery>,
) -> (AgentLink, AgentEndpoint) {
    let (command_tx, command_rx) = crossbeam_channel::bounded(AGENT_COMMAND_CHANNEL_CAPACITY);

    let link = AgentLink {
        session,
        commands: command_tx,
    };
    let endpoint = AgentEndpoint {
        session,
        commands: command_rx,
        events,
        queries,
    };

    (link, endpoint)
}
