//! iHeartRadio integration.

use maestro_ipc::{Capabilities, PlaybackStatus, PlayerState};
use tracing::{debug, warn};
use url::Url;

use crate::broadcaster::{click_element, Broadcaster, BroadcasterDescriptor};
use crate::dom::{ContentPage, Document};

const ARTIST_SELECTOR: &str = "div[data-test=mini-player-description-text] > a";
const ARTWORK_SELECTOR: &str = "div[data-test=mini-player-artwork-image] > img";
const SONG_SELECTOR: &str = "div[data-test=mini-player-track-text] > a";
const STATION_SELECTOR: &str = "div[data-test=mini-player-station-text] > a";

const PLAY_PAUSE_SELECTOR: &str = "button[data-test=play-button]";
const STATE_ATTR: &str = "data-test-state";

const DESCRIPTOR: BroadcasterDescriptor = BroadcasterDescriptor {
    id: "iheartradio",
    name: "iHeartRadio",
    url: "https://www.iheart.com/",
    disabled: false,
    capabilities: Capabilities {
        album_art: true,
        artist: true,
        station: true,
        title: true,
        ..Capabilities::NONE
    },
};

/// iHeartRadio web player.
#[derive(Debug, Default)]
pub struct IHeartRadio;

impl IHeartRadio {
    pub fn new() -> Self {
        Self
    }

    /// Artwork URLs are often protocol-relative and carry resize parameters
    /// in the query string.
    fn artwork(&self, document: &Document) -> Option<String> {
        let src = document.image_source(ARTWORK_SELECTOR)?;
        let absolute = if src.starts_with("//") {
            format!("https:{src}")
        } else {
            src
        };

        match Url::parse(&absolute) {
            Ok(mut url) => {
                url.set_query(None);
                Some(url.into())
            }
            Err(e) => {
                warn!(src = %absolute, "Unparseable artwork URL: {}", e);
                None
            }
        }
    }
}

impl Broadcaster for IHeartRadio {
    fn descriptor(&self) -> &BroadcasterDescriptor {
        &DESCRIPTOR
    }

    fn current_state(&self, document: &Document) -> PlayerState {
        let playback = match document.attribute(PLAY_PAUSE_SELECTOR, STATE_ATTR).as_deref() {
            Some("playing") => Some(PlaybackStatus::Playing),
            Some("paused") => Some(PlaybackStatus::Paused),
            _ => None,
        };

        PlayerState {
            controls_available: Some(document.has_element(PLAY_PAUSE_SELECTOR)),
            playback,
            station: document.text(STATION_SELECTOR),
            artist: document.text(ARTIST_SELECTOR),
            title: document.text(SONG_SELECTOR),
            image_src: self.artwork(document),
            ..Default::default()
        }
    }

    fn play_pause(&self, page: &dyn ContentPage) {
        debug!("playPause");
        click_element(page, PLAY_PAUSE_SELECTOR);
    }
}
