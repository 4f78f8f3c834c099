//! Spotify integration. Disabled: the web player markup has not been mapped
//! for state yet, so only the transport buttons are wired.

use maestro_ipc::Capabilities;
use tracing::debug;

use crate::broadcaster::{click_element, Broadcaster, BroadcasterDescriptor};
use crate::dom::ContentPage;

const PREV_TRACK_SELECTOR: &str = "#player-bar-rewind";
const NEXT_TRACK_SELECTOR: &str = "#player-bar-forward";
const PLAY_PAUSE_SELECTOR: &str = "#player-bar-play-pause";

const DESCRIPTOR: BroadcasterDescriptor = BroadcasterDescriptor {
    id: "spotify",
    name: "Spotify",
    url: "https://open.spotify.com/",
    disabled: true,
    capabilities: Capabilities {
        previous_track: true,
        next_track: true,
        progress: true,
        album_art: true,
        artist: true,
        station: true,
        title: true,
        ..Capabilities::NONE
    },
};

#[derive(Debug, Default)]
pub struct Spotify;

impl Spotify {
    pub fn new() -> Self {
        Self
    }
}

impl Broadcaster for Spotify {
    fn descriptor(&self) -> &BroadcasterDescriptor {
        &DESCRIPTOR
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
