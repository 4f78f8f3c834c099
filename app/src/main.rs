//! Maestro: one control surface for several web radio players.
//!
//! Wires the coordinator, the HTTP content surface, media keys and a stdin
//! console together.

mod console;
mod surface;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, Context};
use crossbeam_channel::{Receiver, Sender};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use maestro_broadcasters::BroadcasterRegistry;
use maestro_engine::menu;
use maestro_engine::{create_coordinator, CoordinatorConfig, JsonFileStore, MediaKeyRouter};
use maestro_interop::AgentConfig;
use maestro_ipc::{coordinator_command_channel, display_channel, CoordinatorCommand, DisplayEvent};

use console::ConsoleInput;
use surface::HttpSurface;

/// Overrides where settings are kept.
const SETTINGS_ENV: &str = "MAESTRO_SETTINGS";

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "maestro=debug,maestro_engine=debug,maestro_interop=debug,maestro_broadcasters=debug,maestro_ipc=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn settings_path() -> anyhow::Result<PathBuf> {
    match env::var_os(SETTINGS_ENV) {
        Some(path) => Ok(PathBuf::from(path)),
        None => JsonFileStore::default_path().context("locating settings file"),
    }
}

/// Backends that must stay alive while their keys are claimed.
#[derive(Default)]
struct MediaKeys {
    #[cfg(all(feature = "mpris", target_os = "linux"))]
    _mpris: Option<maestro_engine::media_keys::MprisMediaKeys>,
}

fn register_media_keys(commands: &Sender<CoordinatorCommand>) -> MediaKeys {
    let router = MediaKeyRouter::new(commands.clone());
    #[allow(unused_mut)]
    let mut keys = MediaKeys::default();

    // The shortcut thread runs for the life of the process.
    #[cfg(feature = "global-keys")]
    if let Err(e) = maestro_engine::media_keys::spawn_global_keys(router.clone()) {
        warn!("Global media keys disabled: {}", e);
    }

    #[cfg(all(feature = "mpris", target_os = "linux"))]
    {
        let mut mpris = maestro_engine::media_keys::MprisMediaKeys::new();
        let connected = router.connect_protocol(&mut mpris);
        info!(connected, "MPRIS media keys");
        keys._mpris = Some(mpris);
    }

    #[cfg(all(feature = "dbus-media-keys", target_os = "linux"))]
    {
        let mut daemon = maestro_engine::media_keys::SettingsDaemonMediaKeys::new();
        let connected = router.connect_protocol(&mut daemon);
        info!(connected, "Settings daemon media keys");
    }

    #[cfg(not(any(
        feature = "global-keys",
        all(feature = "mpris", target_os = "linux"),
        all(feature = "dbus-media-keys", target_os = "linux")
    )))]
    {
        let _ = router;
        info!("No media key backends enabled");
    }

    keys
}

/// Print display events until the coordinator goes away.
fn print_display_events(display_rx: Receiver<DisplayEvent>) {
    for event in display_rx {
        match event {
            DisplayEvent::SetBroadcaster(id) => println!("broadcaster: {id}"),
            DisplayEvent::PlayerStatusUpdate(state) => match serde_json::to_string(&state) {
                Ok(json) => println!("status: {json}"),
                Err(e) => warn!("Failed to format status: {}", e),
            },
            DisplayEvent::MiniModeChanged(mini) => println!("mini player: {mini}"),
            DisplayEvent::Error { message } => println!("error: {message}"),
        }
    }
    info!("Display channel closed");
}

fn run_console(
    command_tx: &Sender<CoordinatorCommand>,
    registry: &BroadcasterRegistry,
) -> anyhow::Result<()> {
    let menus = menu::application_menu(registry);
    println!("{}", console::HELP);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading console input")?;

        match console::parse(&line, &menus) {
            Ok(None) => {}
            Ok(Some(ConsoleInput::Send(command))) => {
                command_tx
                    .send(command)
                    .map_err(|_| anyhow!("coordinator stopped"))?;
            }
            Ok(Some(ConsoleInput::List)) => {
                for item in menu::broadcaster_menu(registry).items {
                    let id = item
                        .id
                        .strip_prefix(menu::BROADCASTER_ITEM_PREFIX)
                        .unwrap_or(&item.id);
                    println!("  {:<16} {}", id, item.label);
                }
            }
            Ok(Some(ConsoleInput::Help)) => println!("{}", console::HELP),
            Ok(Some(ConsoleInput::Quit)) => break,
            Err(message) => println!("{message}"),
        }
        io::stdout().flush().ok();
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Maestro starting");

    let path = settings_path()?;
    let store = JsonFileStore::open(&path)
        .with_context(|| format!("opening settings at {}", path.display()))?;
    info!(path = %store.path().display(), "Settings loaded");

    // Create IPC channels
    let (command_tx, command_rx) = coordinator_command_channel();
    let (display_tx, display_rx) = display_channel();

    let registry = BroadcasterRegistry::standard();
    let surface = HttpSurface::new(registry.clone(), AgentConfig::default(), command_tx.clone())
        .context("creating content surface")?;

    // Start coordinator in background thread
    let coordinator = thread::spawn(move || {
        let mut coordinator = create_coordinator(
            Box::new(store),
            Box::new(surface),
            command_rx,
            display_tx,
            CoordinatorConfig::default(),
        );
        coordinator.run();
    });
    let display = thread::spawn(move || print_display_events(display_rx));

    let _media_keys = register_media_keys(&command_tx);

    let result = run_console(&command_tx, &registry);

    info!("Maestro shutting down");
    if command_tx.send(CoordinatorCommand::Shutdown).is_err() {
        warn!("Coordinator already stopped");
    }
    coordinator
        .join()
        .map_err(|_| anyhow!("coordinator thread panicked"))?;
    display
        .join()
        .map_err(|_| anyhow!("display thread panicked"))?;

    result
}
