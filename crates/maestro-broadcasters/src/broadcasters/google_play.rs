//! Google Play Music integration.
//!
//! Disabled since the service closed; kept so a persisted selection of
//! `google-play` resolves to "not found" instead of an unknown id.

use maestro_ipc::{Capabilities, PlaybackStatus, PlayerState};
use tracing::debug;

use crate::broadcaster::{click_element, progress_percent, Broadcaster, BroadcasterDescriptor};
use crate::dom::{number, ContentPage, Document};

const ALBUM_ART_SELECTOR: &str = "#playerBarArt";
const ARTIST_SELECTOR: &str = "#player-artist";
const CURRENT_TIME_SELECTOR: &str = "#time_container_current";
const DURATION_TIME_SELECTOR: &str = "#time_container_duration";
const PREV_TRACK_SELECTOR: &str = "#player-bar-rewind";
const NEXT_TRACK_SELECTOR: &str = "#player-bar-forward";
const PLAY_PAUSE_SELECTOR: &str = "#player-bar-play-pause";
const SLIDER_SELECTOR: &str = "#material-player-progress";
const TITLE_SELECTOR: &str = "#currently-playing-title";

const DESCRIPTOR: BroadcasterDescriptor = BroadcasterDescriptor {
    id: "google-play",
    name: "Google Play",
    url: "https://play.google.com/music/listen",
    disabled: true,
    capabilities: Capabilities {
        previous_track: true,
        next_track: true,
        progress: true,
        album_art: true,
        artist: true,
        title: true,
        ..Capabilities::NONE
    },
};

#[derive(Debug, Default)]
pub struct GooglePlay;

impl GooglePlay {
    pub fn new() -> Self {
        Self
    }
}

impl Broadcaster for GooglePlay {
    fn descriptor(&self) -> &BroadcasterDescriptor {
        &DESCRIPTOR
    }

    fn current_state(&self, document: &Document) -> PlayerState {
        let controls_available = document.has_element(PLAY_PAUSE_SELECTOR);
        let playing =
            document.attribute(PLAY_PAUSE_SELECTOR, "aria-label").as_deref() == Some("Pause");

        PlayerState {
            controls_available: Some(controls_available),
            playback: controls_available.then_some(if playing {
                PlaybackStatus::Playing
            } else {
                PlaybackStatus::Paused
            }),
            artist: document.text(ARTIST_SELECTOR),
            title: document.text(TITLE_SELECTOR),
            image_src: document.image_source(ALBUM_ART_SELECTOR),
            progress: Some(progress_percent(
                number(document.attribute(SLIDER_SELECTOR, "aria-valuemin")),
                number(document.attribute(SLIDER_SELECTOR, "aria-valuemax")),
                number(document.attribute(SLIDER_SELECTOR, "aria-valuenow")),
            )),
            progress_prefix: document.text(CURRENT_TIME_SELECTOR),
            progress_suffix: document.text(DURATION_TIME_SELECTOR),
            ..Default::default()
        }
    }

    fn previous_track(&self, page: &dyn ContentPage) {
        debug!("previousTrack");
        click_element(page, PREV_TRACK_SELECTOR);
    }

    fn next_track(&self, page: &dyn ContentPage) {
        debug!("nextTrack");
        click_element(page, NEXT_TRACK_SELECTOR);
    }

    fn play_pause(&self, page: &dyn ContentPage) {
        debug!("playPause");
        click_element(page, PLAY_PAUSE_SELECTOR);
    }
}
