//! TuneIn Radio integration.

use maestro_ipc::{Capabilities, PlaybackStatus, PlayerState};

use crate::broadcaster::{click_element, Broadcaster, BroadcasterDescriptor};
use crate::dom::{number, ContentPage, Document};

const ART_SELECTOR: &str = "#playerArtwork";
const PLAY_PAUSE_STOP_BUTTON_SELECTOR: &str = "svg[data-testid^=player-status]";
const DATA_TESTID_KEY: &str = "data-testid";
const PAUSED_STATE_ID: &str = "player-status-paused";
const PLAYING_STATE_ID: &str = "player-status-playing";
const STOPPED_STATE_ID: &str = "player-status-stopped";

const SUBTITLE_SELECTOR: &str = "#playerSubtitle";
const TITLE_SELECTOR: &str = "#playerTitle";

const ELAPSED_TIME_SELECTOR: &str = "#scrubberElapsed";
const DURATION_TIME_SELECTOR: &str = "#scrubberDuration";
const SCRUBBER_INPUT_SELECTOR: &str = "#scrubber input";

const DESCRIPTOR: BroadcasterDescriptor = BroadcasterDescriptor {
    id: "tunein-radio",
    name: "TuneIn Radio",
    url: "https://tunein.com",
    disabled: false,
    capabilities: Capabilities {
        progress: true,
        album_art: true,
        station: true,
        title: true,
        ..Capabilities::NONE
    },
};

/// TuneIn Radio web player.
#[derive(Debug, Default)]
pub struct TuneInRadio;

impl TuneInRadio {
    pub fn new() -> Self {
        Self
    }
}

impl Broadcaster for TuneInRadio {
    fn descriptor(&self) -> &BroadcasterDescriptor {
        &DESCRIPTOR
    }

    fn current_state(&self, document: &Document) -> PlayerState {
        let status = document.attribute(PLAY_PAUSE_STOP_BUTTON_SELECTOR, DATA_TESTID_KEY);
        let playback = match status.as_deref() {
            Some(PLAYING_STATE_ID) => Some(PlaybackStatus::Playing),
            Some(PAUSED_STATE_ID) => Some(PlaybackStatus::Paused),
            Some(STOPPED_STATE_ID) => Some(PlaybackStatus::Stopped),
            _ => None,
        };

        // The scrubber input value is already a percentage.
        let progress = document
            .has_element(SCRUBBER_INPUT_SELECTOR)
            .then(|| {
                number(document.attribute(SCRUBBER_INPUT_SELECTOR, "value"))
                    .unwrap_or(0.0)
                    .clamp(0.0, 100.0)
            });

        PlayerState {
            controls_available: Some(document.has_element(PLAY_PAUSE_STOP_BUTTON_SELECTOR)),
            playback,
            station: document.text(SUBTITLE_SELECTOR),
            title: document.text(TITLE_SELECTOR),
            image_src: document.image_source(ART_SELECTOR),
            progress,
            progress_prefix: document.text(ELAPSED_TIME_SELECTOR),
            progress_suffix: document.text(DURATION_TIME_SELECTOR),
            ..Default::default()
        }
    }

    fn play_pause(&self, page: &dyn ContentPage) {
        click_element(page, PLAY_PAUSE_STOP_BUTTON_SELECTOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_status(status: &str) -> String {
        format!(
            r#"
            <img id="playerArtwork" src="https://cdn-profiles.tunein.com/s24940/images/logoq.jpg">
            <div id="playerTitle">KEXP 90.3</div>
            <div id="playerSubtitle">Where the Music Matters</div>
            <svg data-testid="{status}"></svg>
            <div id="scrubber"><input type="range" value="37.5"></div>
            <span id="scrubberElapsed">12:01</span>
            <span id="scrubberDuration">LIVE</span>
            "#
        )
    }

    #[test]
    fn test_tri_state() {
        let broadcaster = TuneInRadio::new();

        let playing = broadcaster.current_state(&Document::parse(&page_with_status(PLAYING_STATE_ID)));
        assert!(playing.is_playing());

        let paused = broadcaster.current_state(&Document::parse(&page_with_status(PAUSED_STATE_ID)));
        assert!(paused.is_paused());

        let stopped = broadcaster.current_state(&Document::parse(&page_with_status(STOPPED_STATE_ID)));
        assert!(stopped.is_stopped());
    }

    #[test]
    fn test_metadata_and_progress() {
        let state = TuneInRadio::new()
            .current_state(&Document::parse(&page_with_status(PLAYING_STATE_ID)));

        assert_eq!(state.controls_available, Some(true));
        assert_eq!(state.title.as_deref(), Some("KEXP 90.3"));
        assert_eq!(state.station.as_deref(), Some("Where the Music Matters"));
        assert_eq!(state.progress, Some(37.5));
        assert_eq!(state.progress_prefix.as_deref(), Some("12:01"));
        assert_eq!(state.progress_suffix.as_deref(), Some("LIVE"));

        // Time labels are read but not declared, so they never reach the display.
        let published = state.restricted_to(&TuneInRadio::new().descriptor().capabilities);
        assert_eq!(published.progress_prefix, None);
        assert_eq!(published.progress_suffix, None);
        assert_eq!(published.progress, Some(37.5));
    }

    #[test]
    fn test_missing_scrubber_leaves_progress_unsampled() {
        let state = TuneInRadio::new().current_state(&Document::parse("<div></div>"));
        assert_eq!(state.progress, None);
        assert_eq!(state.controls_available, Some(false));
        assert_eq!(state.playback, None);
    }
}
