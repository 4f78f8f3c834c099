//! Global media key shortcuts via `global-hotkey`.
//!
//! The hotkey manager only delivers events while its thread runs the
//! platform event loop, so it lives on a thread of its own. X11 has no loop
//! to pump; `global-hotkey` reads the display on its own thread there. On
//! macOS the loop must be the application's main run loop, which a console
//! binary never starts.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use global_hotkey::hotkey::{Code, HotKey};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{MediaKey, MediaKeyRouter, MediaKeySink, ShortcutBackend};
use crate::error::MediaKeyError;
use crate::MediaKeyResult;

/// Whether this platform lets a background thread own the hotkey manager.
const BACKGROUND_EVENT_LOOP: bool = cfg!(any(target_os = "linux", target_os = "windows"));

/// Claim the media keys on a dedicated thread that keeps the hotkey manager
/// alive and runs its event loop.
///
/// Failures on that thread are reported to the coordinator through the
/// router. An unsupported platform is reported and returned here.
pub fn spawn_global_keys(router: MediaKeyRouter) -> MediaKeyResult<JoinHandle<()>> {
    spawn_with(router, BACKGROUND_EVENT_LOOP)
}

fn spawn_with(router: MediaKeyRouter, background_event_loop: bool) -> MediaKeyResult<JoinHandle<()>> {
    if !background_event_loop {
        let e = MediaKeyError::Unavailable {
            reason: "global shortcuts need the main event loop on this platform".into(),
        };
        router.report_unavailable(&e);
        return Err(e);
    }

    thread::Builder::new()
        .name("media-keys".into())
        .spawn(move || {
            let mut keys = match GlobalKeys::new() {
                Ok(keys) => keys,
                Err(e) => {
                    router.report_unavailable(&e);
                    return;
                }
            };
            if router.register_shortcuts(&mut keys).is_err() {
                return;
            }
            info!("Media key shortcuts registered");
            pump_events();
            drop(keys);
        })
        .map_err(|e| MediaKeyError::Unavailable {
            reason: e.to_string(),
        })
}

#[cfg(target_os = "windows")]
fn pump_events() {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, TranslateMessage, MSG,
    };

    let mut message = MSG::default();
    // SAFETY: `message` outlives every call, and the loop runs on the thread
    // that created the manager's hidden window.
    unsafe {
        while GetMessageW(&mut message, HWND::default(), 0, 0).as_bool() {
            let _ = TranslateMessage(&message);
            DispatchMessageW(&message);
        }
    }
    info!("Media key message loop ended");
}

#[cfg(not(target_os = "windows"))]
fn pump_events() {
    loop {
        thread::park();
    }
}

/// Registered hotkey ids and where their presses go.
type Bindings = Arc<Mutex<HashMap<u32, (MediaKey, MediaKeySink)>>>;

/// System-wide shortcuts. Keep it alive for as long as the keys should stay
/// claimed.
pub struct GlobalKeys {
    manager: GlobalHotKeyManager,
    bindings: Bindings,
    pump_started: bool,
}

impl GlobalKeys {
    pub fn new() -> MediaKeyResult<Self> {
        let manager = GlobalHotKeyManager::new().map_err(|e| MediaKeyError::Registration {
            key: "all",
            reason: e.to_string(),
        })?;

        Ok(Self {
            manager,
            bindings: Arc::new(Mutex::new(HashMap::new())),
            pump_started: false,
        })
    }

    /// Forward hotkey events to the bound sinks.
    fn start_pump(&mut self) {
        if self.pump_started {
            return;
        }
        self.pump_started = true;

        let bindings = Arc::clone(&self.bindings);
        thread::spawn(move || {
            let events = GlobalHotKeyEvent::receiver();
            while let Ok(event) = events.recv() {
                if event.state != HotKeyState::Pressed {
                    continue;
                }
                match bindings.lock().get(&event.id) {
                    Some((key, sink)) => sink.press(*key),
                    None => debug!(id = event.id, "Unbound hotkey event"),
                }
            }
            info!("Hotkey event channel closed");
        });
    }
}

fn code(key: MediaKey) -> Code {
    match key {
        MediaKey::NextTrack => Code::MediaTrackNext,
        MediaKey::PreviousTrack => Code::MediaTrackPrevious,
        MediaKey::Stop => Code::MediaStop,
        MediaKey::PlayPause | MediaKey::Play | MediaKey::Pause => Code::MediaPlayPause,
    }
}

impl ShortcutBackend for GlobalKeys {
    fn register(&mut self, key: MediaKey, sink: MediaKeySink) -> MediaKeyResult<()> {
        let hotkey = HotKey::new(None, code(key));

        self.manager
            .register(hotkey)
            .map_err(|e| MediaKeyError::Registration {
                key: key.name(),
                reason: e.to_string(),
            })?;

        debug!(key = key.name(), id = hotkey.id(), "Registered global shortcut");
        self.bindings.lock().insert(hotkey.id(), (key, sink));
        self.start_pump();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use maestro_ipc::{coordinator_command_channel, CoordinatorCommand};

    use super::*;

    #[test]
    fn test_platform_without_background_loop_reports_unavailable() {
        let (tx, rx) = coordinator_command_channel();

        let result = spawn_with(MediaKeyRouter::new(tx), false);

        assert!(matches!(result, Err(MediaKeyError::Unavailable { .. })));
        match rx.try_recv().unwrap() {
            CoordinatorCommand::CapabilityUnavailable { message } => {
                assert!(message.contains("event loop"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_keys_map_to_hotkey_codes() {
        assert_eq!(code(MediaKey::Play), Code::MediaPlayPause);
        assert_eq!(code(MediaKey::NextTrack), Code::MediaTrackNext);
        assert_eq!(code(MediaKey::Stop), Code::MediaStop);
    }
}
