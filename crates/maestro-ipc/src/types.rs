//! Common types used across IPC messages.

use serde::{Deserialize, Serialize};

/// A playback control routed to the active broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlCommand {
    /// Skip back to the previous track.
    PreviousTrack,

    /// Skip forward to the next track.
    NextTrack,

    /// Toggle between playing and paused.
    PlayPause,

    /// Stop playback.
    Stop,
}

impl ControlCommand {
    /// All control commands, in menu order.
    pub const ALL: [ControlCommand; 4] = [
        Self::PlayPause,
        Self::PreviousTrack,
        Self::NextTrack,
        Self::Stop,
    ];

    /// Returns the wire identifier for this command.
    pub fn id(self) -> &'static str {
        match self {
            Self::PreviousTrack => "previous-track",
            Self::NextTrack => "next-track",
            Self::PlayPause => "play-pause",
            Self::Stop => "stop",
        }
    }

    /// Parses a wire identifier. Unknown identifiers are rejected so the
    /// command surface stays closed.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }
}

/// Playback status reported by a broadcaster page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// One normalized snapshot of a broadcaster's player.
///
/// Every field is optional: `None` means the value was never sampled or the
/// service cannot supply it, which is distinct from a known zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Whether the page currently exposes playback controls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls_available: Option<bool>,

    /// Playing, paused or stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Album art or station logo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,

    /// Completion percentage (0 - 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    /// Text shown before the progress bar (usually elapsed time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_prefix: Option<String>,

    /// Text shown after the progress bar (usually duration or remaining time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_suffix: Option<String>,
}

impl PlayerState {
    /// Returns true if the snapshot reports active playback.
    pub fn is_playing(&self) -> bool {
        self.playback == Some(PlaybackStatus::Playing)
    }

    /// Returns true if the snapshot reports paused playback.
    pub fn is_paused(&self) -> bool {
        self.playback == Some(PlaybackStatus::Paused)
    }

    /// Returns true if the snapshot reports stopped playback.
    pub fn is_stopped(&self) -> bool {
        self.playback == Some(PlaybackStatus::Stopped)
    }

    /// Clears every field the given capability set does not declare.
    pub fn restricted_to(mut self, capabilities: &Capabilities) -> Self {
        if !capabilities.station {
            self.station = None;
        }
        if !capabilities.artist {
            self.artist = None;
        }
        if !capabilities.title {
            self.title = None;
        }
        if !capabilities.album_art {
            self.image_src = None;
        }
        if !capabilities.progress {
            self.progress = None;
        }
        if !capabilities.progress_prefix {
            self.progress_prefix = None;
        }
        if !capabilities.progress_suffix {
            self.progress_suffix = None;
        }
        self
    }
}

/// Which player state fields and controls a broadcaster can supply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub previous_track: bool,
    pub next_track: bool,
    pub separate_stop: bool,

    pub progress: bool,
    pub progress_prefix: bool,
    pub progress_suffix: bool,

    pub album_art: bool,
    pub artist: bool,
    pub genre: bool,
    pub station: bool,
    pub title: bool,
}

impl Capabilities {
    /// No capabilities at all.
    pub const NONE: Capabilities = Capabilities {
        previous_track: false,
        next_track: false,
        separate_stop: false,
        progress: false,
        progress_prefix: false,
        progress_suffix: false,
        album_art: false,
        artist: false,
        genre: false,
        station: false,
        title: false,
    };
}

/// A window rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Initial bounds of the full player window.
pub const DEFAULT_FULL_PLAYER_BOUNDS: Bounds = Bounds {
    x: 100,
    y: 100,
    width: 1024,
    height: 768,
};

/// Initial bounds of the mini player window.
pub const DEFAULT_MINI_PLAYER_BOUNDS: Bounds = Bounds {
    x: 100,
    y: 100,
    width: 300,
    height: 300,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_command_ids() {
        for command in ControlCommand::ALL {
            assert_eq!(ControlCommand::from_id(command.id()), Some(command));
        }
        assert_eq!(ControlCommand::from_id("rewind"), None);
    }

    #[test]
    fn test_player_state_serializes_only_known_fields() {
        let state = PlayerState {
            playback: Some(PlaybackStatus::Playing),
            progress: Some(0.0),
            ..Default::default()
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "playback": "playing", "progress": 0.0 })
        );
    }

    #[test]
    fn test_restricted_to_clears_undeclared_fields() {
        let state = PlayerState {
            controls_available: Some(true),
            playback: Some(PlaybackStatus::Paused),
            station: Some("KEXP".into()),
            artist: Some("Artist".into()),
            title: Some("Title".into()),
            progress: Some(42.0),
            ..Default::default()
        };
        let capabilities = Capabilities {
            station: true,
            title: true,
            ..Capabilities::NONE
        };

        let restricted = state.restricted_to(&capabilities);
        assert_eq!(restricted.station.as_deref(), Some("KEXP"));
        assert_eq!(restricted.title.as_deref(), Some("Title"));
        assert_eq!(restricted.artist, None);
        assert_eq!(restricted.progress, None);
        assert_eq!(restricted.controls_available, Some(true));
        assert!(restricted.is_paused());
    }
}
