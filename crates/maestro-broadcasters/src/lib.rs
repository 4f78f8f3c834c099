//! Broadcaster adapters for maestro.
//!
//! Each supported web player is a [`Broadcaster`]: a strategy that reads a
//! [`Document`] into a normalized [`maestro_ipc::PlayerState`] and turns
//! control commands into synthetic clicks on a [`ContentPage`].

mod broadcaster;
mod broadcasters;
mod dom;
mod error;
mod registry;

pub use broadcaster::{
    click_element, progress_percent, Broadcaster, BroadcasterDescriptor, PlayerWindow,
};
pub use broadcasters::{GooglePlay, IHeartRadio, SiriusXm, Spotify, TuneInRadio, YouTubeMusic};
pub use dom::{number, pixels, ContentPage, Document, HtmlPage};
pub use error::DomError;
pub use registry::BroadcasterRegistry;

/// Result type for DOM access.
pub type DomResult<T> = Result<T, DomError>;
