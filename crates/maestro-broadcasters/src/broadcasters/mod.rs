//! Service adapters, one per supported web player.

mod google_play;
mod iheartradio;
mod siriusxm;
mod spotify;
mod tunein_radio;
mod youtube_music;

pub use google_play::GooglePlay;
pub use iheartradio::IHeartRadio;
pub use siriusxm::SiriusXm;
pub use spotify::Spotify;
pub use tunein_radio::TuneInRadio;
pub use youtube_music::YouTubeMusic;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{Broadcaster, BroadcasterRegistry, Document};

    const UNRELATED_PAGE: &str = r#"
        <html><head><title>Sign in</title></head>
        <body><form><input name="email"><button>Next</button></form></body></html>
    "#;

    fn all() -> Vec<Arc<dyn Broadcaster>> {
        BroadcasterRegistry::standard().all().cloned().collect()
    }

    #[test]
    fn test_no_selectors_matched_yields_defaults() {
        for doc in [Document::parse(""), Document::parse(UNRELATED_PAGE)] {
            for broadcaster in all() {
                let state = broadcaster.current_state(&doc);

                assert!(!state.is_playing(), "{}", broadcaster.id());
                assert_eq!(state.station, None, "{}", broadcaster.id());
                assert_eq!(state.artist, None, "{}", broadcaster.id());
                assert_eq!(state.title, None, "{}", broadcaster.id());
                assert_eq!(state.image_src, None, "{}", broadcaster.id());
                assert_eq!(state.progress_prefix, None, "{}", broadcaster.id());
                assert_eq!(state.progress_suffix, None, "{}", broadcaster.id());
                assert_ne!(state.controls_available, Some(true), "{}", broadcaster.id());
                if let Some(progress) = state.progress {
                    assert_eq!(progress, 0.0, "{}", broadcaster.id());
                }
            }
        }
    }

    #[test]
    fn test_controls_on_empty_page_do_nothing() {
        let page = crate::HtmlPage::new("<html></html>");
        for broadcaster in all() {
            for command in maestro_ipc::ControlCommand::ALL {
                broadcaster.apply(command, &page);
            }
        }
        assert!(page.clicks().is_empty());
    }

    #[test]
    fn test_only_siriusxm_declares_time_labels() {
        let labelled: Vec<&str> = all()
            .iter()
            .filter(|broadcaster| {
                let capabilities = broadcaster.descriptor().capabilities;
                capabilities.progress_prefix || capabilities.progress_suffix
            })
            .map(|broadcaster| broadcaster.id())
            .collect();

        assert_eq!(labelled, vec!["siriusxm"]);
    }
}
