//! The shared broadcaster contract.

use maestro_ipc::{Capabilities, ControlCommand, PlayerState};

use crate::dom::{ContentPage, Document};

/// Static metadata and capability flags for one supported service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcasterDescriptor {
    /// Stable identifier. Persisted, so it must never change.
    pub id: &'static str,

    /// Display name for menus.
    pub name: &'static str,

    /// Page loaded into the content surface.
    pub url: &'static str,

    /// Disabled entries exist but are never offered or resolved.
    pub disabled: bool,

    /// Which state fields and controls the service can supply.
    pub capabilities: Capabilities,
}

/// The window a broadcaster page is loaded into.
pub trait PlayerWindow {
    /// Rewrite the `User-Agent` header of outgoing requests whose URL matches
    /// `url_pattern` (a prefix, optionally ending in `*`).
    ///
    /// Installing the same pattern twice replaces the earlier rule.
    fn override_user_agent(&mut self, url_pattern: &str, user_agent: &str);
}

/// A per-service strategy translating a page into [`PlayerState`] and
/// control actions.
///
/// Every method except [`Broadcaster::descriptor`] has a no-op default:
/// a service that cannot supply state reports an empty snapshot, and a
/// control the service lacks does nothing when invoked.
pub trait Broadcaster: Send + Sync {
    /// Metadata for this service.
    fn descriptor(&self) -> &BroadcasterDescriptor;

    /// One-time hook run against the window before the page is loaded.
    /// Must tolerate being called more than once.
    fn configure(&self, _window: &mut dyn PlayerWindow) {}

    /// Derive a snapshot from the current document. Never fails; missing
    /// elements produce absent fields.
    fn current_state(&self, _document: &Document) -> PlayerState {
        PlayerState::default()
    }

    fn previous_track(&self, _page: &dyn ContentPage) {}

    fn next_track(&self, _page: &dyn ContentPage) {}

    fn play_pause(&self, _page: &dyn ContentPage) {}

    fn stop(&self, _page: &dyn ContentPage) {}

    /// Identifier shorthand.
    fn id(&self) -> &'static str {
        self.descriptor().id
    }

    /// Dispatch a control command to the matching operation.
    fn apply(&self, command: ControlCommand, page: &dyn ContentPage) {
        match command {
            ControlCommand::PreviousTrack => self.previous_track(page),
            ControlCommand::NextTrack => self.next_track(page),
            ControlCommand::PlayPause => self.play_pause(page),
            ControlCommand::Stop => self.stop(page),
        }
    }
}

/// Click the first element matching `selector`. Does nothing if the element
/// is absent.
///
/// Returns true when the click was dispatched and not suppressed.
pub fn click_element(page: &dyn ContentPage, selector: &str) -> bool {
    page.dispatch_click(selector)
}

/// Percentage position of `now` between `min` and `max`, clamped to
/// `[0, 100]`.
///
/// Missing bounds default to `0..1` and a missing position to `min`. When
/// `max == min` the denominator is 1.
pub fn progress_percent(min: Option<f64>, max: Option<f64>, now: Option<f64>) -> f64 {
    let min = min.unwrap_or(0.0);
    let max = max.unwrap_or(1.0);
    let now = now.unwrap_or(min);

    let span = max - min;
    let denominator = if span == 0.0 { 1.0 } else { span };
    let percent = (now - min) / denominator * 100.0;

    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
