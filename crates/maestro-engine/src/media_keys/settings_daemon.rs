//! Media keys from the GNOME and MATE settings daemons over the session bus.
//!
//! Older desktops deliver media keys to the focused application through
//! `org.<desktop>.SettingsDaemon.MediaKeys` rather than letting it grab them
//! globally.

use std::thread;

use tracing::{debug, info, warn};
use zbus::blocking::{Connection, Proxy};

use super::{MediaControlProtocol, MediaKey, MediaKeySink};
use crate::error::MediaKeyError;
use crate::MediaKeyResult;

const APPLICATION: &str = "maestro";
const DESKTOPS: [&str; 2] = ["gnome", "mate"];

/// Maps a `MediaPlayerKeyPressed` key name.
fn media_key(name: &str) -> Option<MediaKey> {
    match name {
        "Next" => Some(MediaKey::NextTrack),
        "Previous" => Some(MediaKey::PreviousTrack),
        "Play" => Some(MediaKey::Play),
        "Pause" => Some(MediaKey::Pause),
        "Stop" => Some(MediaKey::Stop),
        _ => None,
    }
}

/// SettingsDaemon media key listener.
pub struct SettingsDaemonMediaKeys {
    connection: Option<Connection>,
}

impl SettingsDaemonMediaKeys {
    pub fn new() -> Self {
        Self { connection: None }
    }

    fn connection(&mut self) -> zbus::Result<Connection> {
        if let Some(connection) = &self.connection {
            return Ok(connection.clone());
        }
        let connection = Connection::session()?;
        self.connection = Some(connection.clone());
        Ok(connection)
    }

    fn listen(
        connection: &Connection,
        desktop: &str,
        destination: String,
        sink: MediaKeySink,
    ) -> zbus::Result<()> {
        let interface = format!("org.{desktop}.SettingsDaemon.MediaKeys");
        let path = format!("/org/{desktop}/SettingsDaemon/MediaKeys");
        debug!(%destination, %path, %interface, "Connecting to media keys");

        let proxy = Proxy::new(connection, destination, path, interface)?;
        proxy.call_method("GrabMediaPlayerKeys", &(APPLICATION, 0u32))?;
        let signals = proxy.receive_signal("MediaPlayerKeyPressed")?;

        thread::spawn(move || {
            for message in signals {
                match message.body().deserialize::<(String, String)>() {
                    Ok((application, key)) => {
                        debug!(%application, %key, "MediaPlayerKeyPressed");
                        if let Some(key) = media_key(&key) {
                            sink.press(key);
                        }
                    }
                    Err(e) => warn!("Malformed MediaPlayerKeyPressed: {}", e),
                }
            }
            info!("Media key signal stream ended");
        });

        Ok(())
    }
}

impl Default for SettingsDaemonMediaKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaControlProtocol for SettingsDaemonMediaKeys {
    fn environments(&self) -> Vec<String> {
        DESKTOPS.iter().map(|desktop| desktop.to_string()).collect()
    }

    /// Tries the dedicated MediaKeys bus name first, then the daemon's
    /// umbrella name.
    fn connect(&mut self, environment: &str, sink: MediaKeySink) -> MediaKeyResult<()> {
        let protocol_error = |e: zbus::Error| MediaKeyError::Protocol {
            environment: environment.to_string(),
            reason: e.to_string(),
        };

        let connection = self.connection().map_err(protocol_error)?;
        let destinations = [
            format!("org.{environment}.SettingsDaemon.MediaKeys"),
            format!("org.{environment}.SettingsDaemon"),
        ];

        let mut last_error = None;
        for destination in destinations {
            match Self::listen(&connection, environment, destination, sink.clone()) {
                Ok(()) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.map(protocol_error).unwrap_or(MediaKeyError::Protocol {
            environment: environment.to_string(),
            reason: "no destinations".into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(media_key("Play"), Some(MediaKey::Play));
        assert_eq!(media_key("Next"), Some(MediaKey::NextTrack));
        assert_eq!(media_key("Rewind"), None);
    }
}
