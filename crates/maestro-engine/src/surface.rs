//! The window the active broadcaster page lives in.

use maestro_broadcasters::PlayerWindow;
use maestro_ipc::{AgentEndpoint, Bounds};

use crate::SurfaceResult;

/// How far a page load got before [`ContentSurface::load`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    /// The page is loaded.
    Complete,

    /// Still loading. The surface reports the outcome with
    /// [`CoordinatorCommand::PageLoaded`] for the endpoint's session.
    ///
    /// [`CoordinatorCommand::PageLoaded`]: maestro_ipc::CoordinatorCommand::PageLoaded
    InFlight,
}

/// Hosts broadcaster pages.
///
/// Every page load (including history navigation) receives a fresh
/// [`AgentEndpoint`]; the surface is expected to start an interop agent on
/// it once the page is ready.
pub trait ContentSurface: Send {
    /// The window broadcaster `configure` hooks act on.
    fn window(&mut self) -> &mut dyn PlayerWindow;

    /// Load `url`, replacing the current page.
    fn load(&mut self, url: &str, endpoint: AgentEndpoint) -> SurfaceResult<LoadProgress>;

    /// Navigate back. Returns false when there is no history to go back to.
    fn go_back(&mut self, _endpoint: AgentEndpoint) -> SurfaceResult<bool> {
        Ok(false)
    }

    /// Navigate forward. Returns false when there is nothing ahead.
    fn go_forward(&mut self, _endpoint: AgentEndpoint) -> SurfaceResult<bool> {
        Ok(false)
    }

    /// Show the mini player (or the full player when `mini` is false).
    fn set_mini_mode(&mut self, _mini: bool) {}

    /// Place a player window.
    fn set_bounds(&mut self, _mini: bool, _bounds: Bounds) {}
}
