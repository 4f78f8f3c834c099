//! Interop agent for maestro.
//!
//! One agent runs per loaded broadcaster page. It binds the adapter the
//! coordinator has selected, polls the page for state, applies control
//! commands, and takes part in the shutdown handshake when the coordinator
//! switches services.

mod agent;
mod config;

pub use agent::InteropAgent;
pub use config::AgentConfig;

use std::sync::Arc;
use std::thread::JoinHandle;

use maestro_broadcasters::{BroadcasterRegistry, ContentPage};
use maestro_ipc::AgentEndpoint;

/// Create an agent for a freshly loaded page and run it on its own thread.
pub fn spawn_agent(
    registry: BroadcasterRegistry,
    page: Arc<dyn ContentPage>,
    endpoint: AgentEndpoint,
    config: AgentConfig,
) -> JoinHandle<()> {
    InteropAgent::new(registry, page, endpoint, config).spawn()
}
