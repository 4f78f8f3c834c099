//! SiriusXM integration.

use maestro_ipc::{Capabilities, PlaybackStatus, PlayerState};

use crate::broadcaster::{click_element, Broadcaster, BroadcasterDescriptor};
use crate::dom::{pixels, ContentPage, Document};

const PREV_TRACK_SELECTOR: &str = "button.skip-back-btn";
const NEXT_TRACK_SELECTOR: &str = "button.skip-forward-btn";
const PLAY_PAUSE_SELECTOR: &str = "button.play-pause-btn";
const PLAY_PAUSE_IMG_SELECTOR: &str = "img.play-pause-btn__img";
const LOGO_IMG_SELECTOR: &str = "div.sxm-player-controls img.channel-image";

const ELAPSED_TIME_SELECTOR: &str = "span.elapsed-time";
const REMAINING_TIME_SELECTOR: &str = "span.remaining-time";

// Station name candidates, most specific first.
const CHANNEL_NAME_SELECTOR: &str = "p.channel-name";
const CHANNEL_NUMBER_SELECTOR: &str = "p.channel-number";
const SHOW_TITLE_SELECTOR: &str = "p.show-title";

const ARTIST_NAME_SELECTOR: &str = "p.artist-name";
const TRACK_NAME_SELECTOR: &str = "p.track-name";

const PROGRESS_BAR_WIDTH_SELECTOR: &str = "#progress-bar-background";
const CURRENT_POSITION_SELECTOR: &str = "#current-listening-position";

const DESCRIPTOR: BroadcasterDescriptor = BroadcasterDescriptor {
    id: "siriusxm",
    name: "SiriusXM",
    url: "https://player.siriusxm.com",
    disabled: false,
    capabilities: Capabilities {
        previous_track: true,
        next_track: true,
        progress: true,
        progress_prefix: true,
        progress_suffix: true,
        album_art: true,
        artist: true,
        station: true,
        title: true,
        ..Capabilities::NONE
    },
};

/// SiriusXM web player.
#[derive(Debug, Default)]
pub struct SiriusXm;

impl SiriusXm {
    pub fn new() -> Self {
        Self
    }

    /// The play/pause button shows a pause icon while playing.
    fn is_playing(&self, document: &Document) -> bool {
        document
            .image_source(PLAY_PAUSE_IMG_SELECTOR)
            .is_some_and(|src| src.ends_with("pause.svg"))
    }

    fn station(&self, document: &Document) -> Option<String> {
        document
            .text(CHANNEL_NAME_SELECTOR)
            .or_else(|| document.text(CHANNEL_NUMBER_SELECTOR))
            .or_else(|| document.text(SHOW_TITLE_SELECTOR))
    }

    /// Position marker width relative to the full bar.
    fn progress(&self, document: &Document) -> f64 {
        let position = document
            .style_attributes(CURRENT_POSITION_SELECTOR)
            .and_then(|style| style.get("width").and_then(|width| pixels(width)))
            .unwrap_or(0.0);
        let total = document.client_width(PROGRESS_BAR_WIDTH_SELECTOR);

        if total == 0.0 {
            0.0
        } else {
            (position / total * 100.0).clamp(0.0, 100.0)
        }
    }
}

impl Broadcaster for SiriusXm {
    fn descriptor(&self) -> &BroadcasterDescriptor {
        &DESCRIPTOR
    }

    fn current_state(&self, document: &Document) -> PlayerState {
        let controls_available = document.has_element(PLAY_PAUSE_SELECTOR);
        let playback = match (controls_available, self.is_playing(document)) {
            (_, true) => Some(PlaybackStatus::Playing),
            (true, false) => Some(PlaybackStatus::Paused),
            (false, false) => None,
        };

        PlayerState {
            controls_available: Some(controls_available),
            playback,
            station: self.station(document),
            artist: document.text(ARTIST_NAME_SELECTOR),
            title: document.text(TRACK_NAME_SELECTOR),
            image_src: document.image_source(LOGO_IMG_SELECTOR),
            progress: Some(self.progress(document)),
            progress_prefix: document.text(ELAPSED_TIME_SELECTOR),
            progress_suffix: document.text(REMAINING_TIME_SELECTOR),
        }
    }

    fn previous_track(&self, page: &dyn ContentPage) {
        click_element(page, PREV_TRACK_SELECTOR);
    }

    fn next_track(&self, page: &dyn ContentPage) {
        click_element(page, NEXT_TRACK_SELECTOR);
    }

    fn play_pause(&self, page: &dyn ContentPage) {
        click_element(page, PLAY_PAUSE_SELECTOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HtmlPage;

    const PLAYING: &str = r#"
        <div class="sxm-player-controls">
            <img class="channel-image" src="https://siriusxm.com/logos/hits1.png">
            <button class="skip-back-btn"></button>
            <button class="play-pause-btn"><img class="play-pause-btn__img" src="/assets/pause.svg"></button>
            <button class="skip-forward-btn"></button>
        </div>
        <p class="channel-number">Ch 2</p>
        <p class="artist-name">Dua Lipa</p>
        <p class="track-name">Houdini</p>
        <span class="elapsed-time">1:05</span>
        <span class="remaining-time">-2:10</span>
        <div id="progress-bar-background" style="width: 400px">
            <div id="current-listening-position" style="width:100px;"></div>
        </div>
    "#;

    #[test]
    fn test_playing_state() {
        let state = SiriusXm::new().current_state(&Document::parse(PLAYING));

        assert!(state.is_playing());
        assert_eq!(state.station.as_deref(), Some("Ch 2"));
        assert_eq!(state.artist.as_deref(), Some("Dua Lipa"));
        assert_eq!(state.title.as_deref(), Some("Houdini"));
        assert_eq!(
            state.image_src.as_deref(),
            Some("https://siriusxm.com/logos/hits1.png")
        );
        assert_eq!(state.progress, Some(25.0));
        assert_eq!(state.progress_prefix.as_deref(), Some("1:05"));
        assert_eq!(state.progress_suffix.as_deref(), Some("-2:10"));
    }

    #[test]
    fn test_station_prefers_channel_name() {
        let doc = Document::parse(
            r#"<p class="show-title">Morning</p><p class="channel-name">Hits 1</p>"#,
        );
        assert_eq!(
            SiriusXm::new().current_state(&doc).station.as_deref(),
            Some("Hits 1")
        );
    }

    #[test]
    fn test_zero_width_bar_has_zero_progress() {
        let doc = Document::parse(
            r#"<div id="current-listening-position" style="width:100px"></div>"#,
        );
        assert_eq!(SiriusXm::new().current_state(&doc).progress, Some(0.0));
    }

    #[test]
    fn test_paused_when_play_icon_shown() {
        let doc = Document::parse(
            r#"<button class="play-pause-btn"><img class="play-pause-btn__img" src="/assets/play.svg"></button>"#,
        );
        assert!(SiriusXm::new().current_state(&doc).is_paused());
    }

    #[test]
    fn test_track_controls() {
        let page = HtmlPage::new(PLAYING);
        let broadcaster = SiriusXm::new();

        broadcaster.previous_track(&page);
        broadcaster.next_track(&page);
        broadcaster.stop(&page);

        assert_eq!(
            page.clicks(),
            vec![PREV_TRACK_SELECTOR.to_string(), NEXT_TRACK_SELECTOR.to_string()]
        );
    }
}
