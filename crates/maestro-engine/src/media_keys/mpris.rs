//! MPRIS player on the session bus.
//!
//! Maestro registers as `org.mpris.MediaPlayer2.maestro` so desktop shells and
//! `playerctl` can send it transport commands. Playback state is not
//! published; the player only listens.

use std::collections::HashMap;

use tracing::{debug, info};
use zbus::blocking::connection::Builder;
use zbus::blocking::Connection;
use zbus::interface;
use zbus::zvariant::OwnedValue;

use super::{MediaControlProtocol, MediaKey, MediaKeySink};
use crate::error::MediaKeyError;
use crate::MediaKeyResult;

const BUS_NAME_PREFIX: &str = "org.mpris.MediaPlayer2";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const APPLICATION: &str = "maestro";

/// Maps an `org.mpris.MediaPlayer2.Player` method name.
fn media_key(method: &str) -> Option<MediaKey> {
    match method {
        "Play" => Some(MediaKey::Play),
        "Pause" => Some(MediaKey::Pause),
        "PlayPause" => Some(MediaKey::PlayPause),
        "Next" => Some(MediaKey::NextTrack),
        "Previous" => Some(MediaKey::PreviousTrack),
        "Stop" => Some(MediaKey::Stop),
        _ => None,
    }
}

/// `org.mpris.MediaPlayer2`
struct Root;

#[interface(name = "org.mpris.MediaPlayer2")]
impl Root {
    fn raise(&self) {}

    fn quit(&self) {}

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        "Maestro".into()
    }

    #[zbus(property)]
    fn desktop_entry(&self) -> String {
        APPLICATION.into()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["http".into(), "https".into()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec!["audio/*".into()]
    }
}

/// `org.mpris.MediaPlayer2.Player`
struct Player {
    sink: MediaKeySink,
}

impl Player {
    fn call(&self, method: &str) {
        debug!(method, "MPRIS call");
        if let Some(key) = media_key(method) {
            self.sink.press(key);
        }
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl Player {
    fn play(&self) {
        self.call("Play");
    }

    fn pause(&self) {
        self.call("Pause");
    }

    fn play_pause(&self) {
        self.call("PlayPause");
    }

    fn next(&self) {
        self.call("Next");
    }

    fn previous(&self) {
        self.call("Previous");
    }

    fn stop(&self) {
        self.call("Stop");
    }

    fn seek(&self, _offset: i64) {}

    #[zbus(property)]
    fn playback_status(&self) -> String {
        "Stopped".into()
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        HashMap::new()
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        0
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }
}

/// MPRIS listener. Keep it alive for as long as the bus name should stay
/// registered.
#[derive(Default)]
pub struct MprisMediaKeys {
    connection: Option<Connection>,
}

impl MprisMediaKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaControlProtocol for MprisMediaKeys {
    fn environments(&self) -> Vec<String> {
        vec![format!("{BUS_NAME_PREFIX}.{APPLICATION}")]
    }

    fn connect(&mut self, environment: &str, sink: MediaKeySink) -> MediaKeyResult<()> {
        let protocol_error = |e: zbus::Error| MediaKeyError::Protocol {
            environment: environment.to_string(),
            reason: e.to_string(),
        };

        let connection = Builder::session()
            .and_then(|builder| builder.name(environment.to_string()))
            .and_then(|builder| builder.serve_at(OBJECT_PATH, Root))
            .and_then(|builder| builder.serve_at(OBJECT_PATH, Player { sink }))
            .and_then(|builder| builder.build())
            .map_err(protocol_error)?;

        info!(bus_name = %environment, "MPRIS player registered");
        self.connection = Some(connection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use maestro_ipc::{coordinator_command_channel, ControlCommand, CoordinatorCommand};

    use super::*;
    use crate::MediaKeyRouter;

    #[test]
    fn test_player_methods_normalize() {
        let (tx, rx) = coordinator_command_channel();
        let player = Player {
            sink: MediaKeyRouter::new(tx).sink(),
        };

        for method in ["Play", "Pause", "PlayPause", "Next", "Previous", "Stop", "Seek"] {
            player.call(method);
        }

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![
                CoordinatorCommand::Control(ControlCommand::PlayPause),
                CoordinatorCommand::Control(ControlCommand::PlayPause),
                CoordinatorCommand::Control(ControlCommand::PlayPause),
                CoordinatorCommand::Control(ControlCommand::NextTrack),
                CoordinatorCommand::Control(ControlCommand::PreviousTrack),
                CoordinatorCommand::Control(ControlCommand::Stop),
            ]
        );
    }

    #[test]
    fn test_bus_name() {
        assert_eq!(
            MprisMediaKeys::new().environments(),
            vec!["org.mpris.MediaPlayer2.maestro".to_string()]
        );
    }
}
