//! Error types for DOM access.

use thiserror::Error;

/// Errors that can occur while reading a broadcaster page.
///
/// A missing element is never an error; these cover the page itself being
/// unreadable.
#[derive(Debug, Error)]
pub enum DomError {
    /// The page cannot be read right now (navigating, crashed, not loaded).
    #[error("Page unavailable: {0}")]
    Unavailable(String),
}
