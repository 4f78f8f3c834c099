//! System media key integration.
//!
//! Two kinds of backend feed the router: global shortcut registration, where
//! any failure removes the capability and is reported, and best-effort
//! media-control protocols tried per desktop environment, where failures are
//! only logged.

#[cfg(feature = "global-keys")]
mod global_keys;
#[cfg(all(feature = "mpris", target_os = "linux"))]
mod mpris;
#[cfg(all(feature = "dbus-media-keys", target_os = "linux"))]
mod settings_daemon;

#[cfg(feature = "global-keys")]
pub use global_keys::spawn_global_keys;
#[cfg(all(feature = "mpris", target_os = "linux"))]
pub use mpris::MprisMediaKeys;
#[cfg(all(feature = "dbus-media-keys", target_os = "linux"))]
pub use settings_daemon::SettingsDaemonMediaKeys;

use crossbeam_channel::Sender;
use tracing::{debug, error, info, warn};

use maestro_ipc::{ControlCommand, CoordinatorCommand};

use crate::error::MediaKeyError;
use crate::MediaKeyResult;

/// A hardware or protocol media key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKey {
    NextTrack,
    PreviousTrack,
    Stop,
    PlayPause,
    Play,
    Pause,
}

impl MediaKey {
    /// Keys claimed as global shortcuts, in registration order.
    pub const SHORTCUTS: [MediaKey; 4] = [
        Self::NextTrack,
        Self::PlayPause,
        Self::Stop,
        Self::PreviousTrack,
    ];

    /// The control this key triggers. Separate play and pause keys both
    /// toggle, since the page only exposes one button.
    pub fn command(self) -> ControlCommand {
        match self {
            Self::NextTrack => ControlCommand::NextTrack,
            Self::PreviousTrack => ControlCommand::PreviousTrack,
            Self::Stop => ControlCommand::Stop,
            Self::PlayPause | Self::Play | Self::Pause => ControlCommand::PlayPause,
        }
    }

    /// Accelerator name of the key.
    pub fn name(self) -> &'static str {
        match self {
            Self::NextTrack => "MediaNextTrack",
            Self::PreviousTrack => "MediaPreviousTrack",
            Self::Stop => "MediaStop",
            Self::PlayPause => "MediaPlayPause",
            Self::Play => "MediaPlay",
            Self::Pause => "MediaPause",
        }
    }
}

/// Where backends deliver key presses.
#[derive(Debug, Clone)]
pub struct MediaKeySink {
    commands: Sender<CoordinatorCommand>,
}

impl MediaKeySink {
    /// Normalize a key press and forward it to the coordinator.
    pub fn press(&self, key: MediaKey) {
        debug!(key = key.name(), "Media key");
        if let Err(e) = self
            .commands
            .try_send(CoordinatorCommand::Control(key.command()))
        {
            warn!(key = key.name(), "Failed to forward media key: {}", e);
        }
    }
}

/// Claims one system-wide shortcut per key.
pub trait ShortcutBackend {
    fn register(&mut self, key: MediaKey, sink: MediaKeySink) -> MediaKeyResult<()>;
}

/// A media-control service reachable under several environment names.
pub trait MediaControlProtocol {
    /// Environment names to try, in order.
    fn environments(&self) -> Vec<String>;

    /// Connect to the service for one environment and start delivering key
    /// presses to `sink`.
    fn connect(&mut self, environment: &str, sink: MediaKeySink) -> MediaKeyResult<()>;
}

/// Turns media keys from every backend into coordinator controls.
#[derive(Debug, Clone)]
pub struct MediaKeyRouter {
    sink: MediaKeySink,
}

impl MediaKeyRouter {
    pub fn new(commands: Sender<CoordinatorCommand>) -> Self {
        Self {
            sink: MediaKeySink { commands },
        }
    }

    pub fn sink(&self) -> MediaKeySink {
        self.sink.clone()
    }

    /// Register the four control keys as global shortcuts.
    ///
    /// Stops at the first failure, reports it to the coordinator and returns
    /// it. Keys registered before the failure stay registered.
    pub fn register_shortcuts(&self, backend: &mut dyn ShortcutBackend) -> MediaKeyResult<()> {
        info!("Registering media key shortcuts");

        for key in MediaKey::SHORTCUTS {
            if let Err(e) = backend.register(key, self.sink()) {
                self.report_unavailable(&e);
                return Err(e);
            }
        }

        Ok(())
    }

    /// Tell the coordinator that media keys will not work.
    pub fn report_unavailable(&self, e: &MediaKeyError) {
        error!("{}", e);
        let report = CoordinatorCommand::CapabilityUnavailable {
            message: e.to_string(),
        };
        if self.sink.commands.try_send(report).is_err() {
            warn!("Failed to report media key failure");
        }
    }

    /// Try every environment of a media-control protocol. Failures are
    /// logged and skipped. Returns how many environments connected.
    pub fn connect_protocol(&self, protocol: &mut dyn MediaControlProtocol) -> usize {
        let mut connected = 0;

        for environment in protocol.environments() {
            match protocol.connect(&environment, self.sink()) {
                Ok(()) => {
                    info!(%environment, "Media control protocol connected");
                    connected += 1;
                }
                Err(e) => warn!(%environment, "Skipping media control protocol: {}", e),
            }
        }

        connected
    }
}
