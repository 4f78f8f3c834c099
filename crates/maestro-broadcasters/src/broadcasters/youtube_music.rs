//! YouTube Music integration.

use std::sync::LazyLock;

use maestro_ipc::{Capabilities, PlaybackStatus, PlayerState, DEFAULT_MINI_PLAYER_BOUNDS};
use regex::Regex;
use tracing::debug;

use crate::broadcaster::{
    click_element, progress_percent, Broadcaster, BroadcasterDescriptor, PlayerWindow,
};
use crate::dom::{number, ContentPage, Document};

const PREV_TRACK_SELECTOR: &str =
    "#left-controls > div > paper-icon-button.previous-button.style-scope.ytmusic-player-bar";
const NEXT_TRACK_SELECTOR: &str =
    "#left-controls > div > paper-icon-button.next-button.style-scope.ytmusic-player-bar";
const PLAY_PAUSE_SELECTOR: &str = "#play-pause-button";

const SLIDER_SELECTOR: &str = "#progress-bar";
const TIME_INFO_SELECTOR: &str = "#left-controls > span.time-info";

const ALBUM_ART_SELECTOR: &str =
    "#layout > ytmusic-player-bar > div.middle-controls.style-scope.ytmusic-player-bar > img";
const TITLE_SELECTOR: &str = "#layout > ytmusic-player-bar > div.middle-controls.style-scope.ytmusic-player-bar > div.content-info-wrapper.style-scope.ytmusic-player-bar > yt-formatted-string";
const ARTIST_SELECTOR: &str = "#layout > ytmusic-player-bar > div.middle-controls.style-scope.ytmusic-player-bar > div.content-info-wrapper.style-scope.ytmusic-player-bar > span > span.subtitle.style-scope.ytmusic-player-bar > yt-formatted-string > a:nth-child(1)";

/// Google's sign-in page rejects embedded browsers; present a desktop
/// Firefox instead.
const SIGN_IN_URL_PATTERN: &str = "https://accounts.google.com/*";
const SIGN_IN_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:73.0) Gecko/20100101 Firefox/73.0";

static ALBUM_ART_RESIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(http.+=w)([0-9]+)(-h)([0-9]+)(-.+)").expect("album art pattern is valid")
});

const DESCRIPTOR: BroadcasterDescriptor = BroadcasterDescriptor {
    id: "youtube-music",
    name: "YouTube Music",
    url: "https://music.youtube.com/",
    disabled: false,
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

/// YouTube Music web player.
#[derive(Debug, Default)]
pub struct YouTubeMusic;

impl YouTubeMusic {
    pub fn new() -> Self {
        Self
    }

    /// Thumbnail URLs encode their size as `=w<width>-h<height>-`; ask for
    /// the mini player size instead.
    fn album_art(&self, document: &Document) -> Option<String> {
        let src = document.image_source(ALBUM_ART_SELECTOR)?;
        let replacement = format!(
            "${{1}}{}${{3}}{}${{5}}",
            DEFAULT_MINI_PLAYER_BOUNDS.width, DEFAULT_MINI_PLAYER_BOUNDS.height
        );
        Some(ALBUM_ART_RESIZE.replace(&src, replacement.as_str()).into_owned())
    }

    /// `"1:23 / 4:56"` split into elapsed and duration.
    fn time_info(&self, document: &Document) -> (Option<String>, Option<String>) {
        let Some(info) = document.text(TIME_INFO_SELECTOR) else {
            return (None, None);
        };

        match info.split_once('/') {
            Some((elapsed, duration)) => (
                Some(elapsed.trim().to_string()),
                Some(duration.trim().to_string()),
            ),
            None => (Some(info.trim().to_string()), None),
        }
    }

    fn progress(&self, document: &Document) -> f64 {
        progress_percent(
            number(document.attribute(SLIDER_SELECTOR, "aria-valuemin")),
            number(document.attribute(SLIDER_SELECTOR, "aria-valuemax")),
            number(document.attribute(SLIDER_SELECTOR, "aria-valuenow")),
        )
    }
}

impl Broadcaster for YouTubeMusic {
    fn descriptor(&self) -> &BroadcasterDescriptor {
        &DESCRIPTOR
    }

    fn configure(&self, window: &mut dyn PlayerWindow) {
        window.override_user_agent(SIGN_IN_URL_PATTERN, SIGN_IN_USER_AGENT);
    }

    fn current_state(&self, document: &Document) -> PlayerState {
        let controls_available = document.has_element(PLAY_PAUSE_SELECTOR);

        let mut state = PlayerState {
            controls_available: Some(controls_available),
            artist: document.text(ARTIST_SELECTOR),
            title: document.text(TITLE_SELECTOR),
            ..Default::default()
        };

        if controls_available {
            let playing =
                document.attribute(PLAY_PAUSE_SELECTOR, "aria-label").as_deref() == Some("Pause");
            let (elapsed, duration) = self.time_info(document);

            state.playback = Some(if playing {
                PlaybackStatus::Playing
            } else {
                PlaybackStatus::Paused
            });
            state.image_src = self.album_art(document);
            state.progress = Some(self.progress(document));
            state.progress_prefix = elapsed;
            state.progress_suffix = duration;
        }

        state
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
