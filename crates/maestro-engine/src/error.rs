//! Error types for the coordinator and its collaborators.

use thiserror::Error;

/// Errors that can occur while coordinating broadcasters.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The registry has no enabled broadcaster to open.
    #[error("No enabled broadcasters")]
    NoBroadcasters,

    /// The content surface failed to load a page.
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// Errors from the settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No per-user configuration directory on this platform.
    #[error("No configuration directory")]
    NoConfigDir,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON.
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the content surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The page could not be loaded.
    #[error("Failed to load {url}: {reason}")]
    Load { url: String, reason: String },
}

/// Errors from media key integrations.
#[derive(Debug, Error)]
pub enum MediaKeyError {
    /// A global shortcut could not be claimed.
    #[error("Failed to register global shortcut key {key}: {reason}")]
    Registration { key: &'static str, reason: String },

    /// A media-control protocol endpoint could not be reached.
    #[error("Media control protocol unavailable for {environment}: {reason}")]
    Protocol { environment: String, reason: String },

    /// Media keys cannot be claimed at all on this system.
    #[error("Media keys unavailable: {reason}")]
    Unavailable { reason: String },
}
