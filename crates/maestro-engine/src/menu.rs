//! Declarative application menu tables.
//!
//! Menu construction belongs to the windowing layer; this module only
//! defines which items exist and which [`MenuAction`] each one triggers.

use maestro_broadcasters::BroadcasterRegistry;
use maestro_ipc::MenuAction;

/// One actionable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Stable item id.
    pub id: String,

    pub label: String,

    /// Keyboard shortcut in `CmdOrCtrl+X` notation.
    pub accelerator: Option<&'static str>,

    /// Whether the item shows a check mark.
    pub checkbox: bool,

    pub action: MenuAction,
}

impl MenuItem {
    fn new(id: &str, label: &str, action: MenuAction) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            accelerator: None,
            checkbox: false,
            action,
        }
    }

    fn accelerator(mut self, accelerator: &'static str) -> Self {
        self.accelerator = Some(accelerator);
        self
    }

    fn checkbox(mut self) -> Self {
        self.checkbox = true;
        self
    }
}

/// A top-level menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub label: &'static str,
    pub items: Vec<MenuItem>,
}

pub const EVENT_PLAY_PAUSE: &str = "event-play-pause";
pub const EVENT_PREVIOUS_TRACK: &str = "event-previous-track";
pub const EVENT_NEXT_TRACK: &str = "event-next-track";
pub const EVENT_PREVIOUS_PAGE: &str = "event-previous-page";
pub const EVENT_NEXT_PAGE: &str = "event-next-page";
pub const EVENT_MINI_PLAYER_TOGGLE: &str = "event-mini-player-toggle";
pub const EVENT_ABOUT: &str = "event-about";
pub const EVENT_PREFERENCES: &str = "event-preferences";

/// Prefix of broadcaster selection item ids.
pub const BROADCASTER_ITEM_PREFIX: &str = "broadcaster-";

/// One item per enabled broadcaster, in registry order.
pub fn broadcaster_menu(registry: &BroadcasterRegistry) -> Menu {
    let items = registry
        .enabled()
        .map(|broadcaster| {
            let descriptor = broadcaster.descriptor();
            MenuItem::new(
                &format!("{BROADCASTER_ITEM_PREFIX}{}", descriptor.id),
                descriptor.name,
                MenuAction::SelectBroadcaster(descriptor.id.to_string()),
            )
        })
        .collect();

    Menu {
        label: "Broadcaster",
        items,
    }
}

pub fn playback_menu() -> Menu {
    Menu {
        label: "Playback",
        items: vec![
            MenuItem::new(EVENT_PLAY_PAUSE, "Play / Pause", MenuAction::PlayPause),
            MenuItem::new(
                EVENT_PREVIOUS_TRACK,
                "Previous Track",
                MenuAction::PreviousTrack,
            ),
            MenuItem::new(EVENT_NEXT_TRACK, "Next Track", MenuAction::NextTrack),
        ],
    }
}

pub fn view_menu() -> Menu {
    Menu {
        label: "View",
        items: vec![
            MenuItem::new(EVENT_PREVIOUS_PAGE, "Previous Page", MenuAction::PreviousPage)
                .accelerator("CmdOrCtrl+["),
            MenuItem::new(EVENT_NEXT_PAGE, "Next Page", MenuAction::NextPage)
                .accelerator("CmdOrCtrl+]"),
        ],
    }
}

pub fn window_menu() -> Menu {
    Menu {
        label: "Window",
        items: vec![MenuItem::new(
            EVENT_MINI_PLAYER_TOGGLE,
            "Toggle Mini Player",
            MenuAction::ToggleMiniPlayer,
        )
        .accelerator("CmdOrCtrl+Shift+M")
        .checkbox()],
    }
}

pub fn help_menu() -> Menu {
    Menu {
        label: "Help",
        items: vec![
            MenuItem::new(EVENT_ABOUT, "About", MenuAction::About),
            MenuItem::new(EVENT_PREFERENCES, "Preferences", MenuAction::Preferences)
                .accelerator("CmdOrCtrl+,"),
        ],
    }
}

/// The full application menu, in display order.
pub fn application_menu(registry: &BroadcasterRegistry) -> Vec<Menu> {
    vec![
        broadcaster_menu(registry),
        playback_menu(),
        view_menu(),
        window_menu(),
        help_menu(),
    ]
}

/// Look up the action bound to a menu item id.
pub fn action_for(menus: &[Menu], id: &str) -> Option<MenuAction> {
    menus
        .iter()
        .flat_map(|menu| menu.items.iter())
        .find(|item| item.id == id)
        .map(|item| item.action.clone())
}
