//! Coordinator for maestro.
//!
//! The coordinator owns the active broadcaster selection. It runs the switch
//! handshake with the interop agent of the loaded page, relays agent state to
//! the display surface, and routes controls from menus and media keys to the
//! bound agent.

mod bounds;
mod config;
mod coordinator;
mod error;
pub mod media_keys;
pub mod menu;
mod store;
mod surface;

pub use bounds::BoundsDebouncer;
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::{EngineError, MediaKeyError, StoreError, SurfaceError};
pub use media_keys::{MediaKey, MediaKeyRouter, MediaKeySink};
pub use store::{
    bounds_key, stored_bounds, JsonFileStore, MemoryStore, SettingsStore, LAST_BROADCASTER_KEY,
};
pub use surface::{ContentSurface, LoadProgress};

use crossbeam_channel::{Receiver, Sender};
use maestro_broadcasters::BroadcasterRegistry;
use maestro_ipc::{CoordinatorCommand, DisplayEvent};

/// Result type for coordinator operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for settings store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for content surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Result type for media key integrations.
pub type MediaKeyResult<T> = Result<T, MediaKeyError>;

/// Create a coordinator over the standard broadcaster catalog.
pub fn create_coordinator(
    store: Box<dyn SettingsStore>,
    surface: Box<dyn ContentSurface>,
    command_rx: Receiver<CoordinatorCommand>,
    display_tx: Sender<DisplayEvent>,
    config: CoordinatorConfig,
) -> Coordinator {
    Coordinator::new(
        BroadcasterRegistry::standard(),
        store,
        surface,
        command_rx,
        display_tx,
        config,
    )
}
