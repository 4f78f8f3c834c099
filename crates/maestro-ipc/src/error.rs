//! Error types for IPC.

use thiserror::Error;

/// Errors that can occur on an IPC channel.
#[derive(Debug, Error)]
pub enum IpcError {
    /// The other side of the channel is gone.
    #[error("Channel disconnected")]
    Disconnected,

    /// The receiving side is not keeping up.
    #[error("Channel full")]
    Full,

    /// No reply arrived in time.
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
}
