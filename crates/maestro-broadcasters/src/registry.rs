//! The fixed catalog of supported services.

use std::sync::Arc;

use crate::broadcaster::Broadcaster;
use crate::broadcasters::{GooglePlay, IHeartRadio, SiriusXm, Spotify, TuneInRadio, YouTubeMusic};

/// Ordered catalog of broadcasters. Disabled entries are kept but never
/// resolved by lookup or offered in menus.
#[derive(Clone)]
pub struct BroadcasterRegistry {
    broadcasters: Vec<Arc<dyn Broadcaster>>,
}

impl BroadcasterRegistry {
    pub fn new(broadcasters: Vec<Arc<dyn Broadcaster>>) -> Self {
        Self { broadcasters }
    }

    /// The built-in catalog, in menu order.
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(IHeartRadio::new()),
            Arc::new(GooglePlay::new()),
            Arc::new(SiriusXm::new()),
            Arc::new(Spotify::new()),
            Arc::new(TuneInRadio::new()),
            Arc::new(YouTubeMusic::new()),
        ])
    }

    /// Look up an enabled broadcaster by id.
    pub fn by_id(&self, id: &str) -> Option<Arc<dyn Broadcaster>> {
        self.enabled().find(|b| b.id() == id).cloned()
    }

    /// Look up an enabled broadcaster by display name.
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Broadcaster>> {
        self.enabled()
            .find(|b| b.descriptor().name == name)
            .cloned()
    }

    /// Enabled broadcasters, in catalog order.
    pub fn enabled(&self) -> impl Iterator<Item = &Arc<dyn Broadcaster>> {
        self.broadcasters.iter().filter(|b| !b.descriptor().disabled)
    }

    /// The default selection when nothing has been persisted.
    pub fn first_enabled(&self) -> Option<Arc<dyn Broadcaster>> {
        self.enabled().next().cloned()
    }

    /// Every broadcaster, including disabled ones.
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Broadcaster>> {
        self.broadcasters.iter()
    }
}

impl Default for BroadcasterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for BroadcasterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.broadcasters.iter().map(|b| b.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_order() {
        let registry = BroadcasterRegistry::standard();
        let ids: Vec<_> = registry.enabled().map(|b| b.id()).collect();
        assert_eq!(
            ids,
            vec!["iheartradio", "siriusxm", "tunein-radio", "youtube-music"]
        );
    }

    #[test]
    fn test_disabled_not_resolved() {
        let registry = BroadcasterRegistry::standard();
        assert!(registry.all().any(|b| b.id() == "spotify"));
        assert!(registry.by_id("spotify").is_none());
        assert!(registry.by_id("google-play").is_none());
        assert!(registry.by_name("Spotify").is_none());
    }

    #[test]
    fn test_lookup() {
        let registry = BroadcasterRegistry::standard();
        assert_eq!(registry.by_id("siriusxm").map(|b| b.id()), Some("siriusxm"));
        assert_eq!(
            registry.by_name("YouTube Music").map(|b| b.id()),
            Some("youtube-music")
        );
        assert!(registry.by_id("pandora").is_none());
        assert_eq!(registry.first_enabled().map(|b| b.id()), Some("iheartradio"));
    }

    #[test]
    fn test_ids_unique() {
        let registry = BroadcasterRegistry::standard();
        let mut ids: Vec<_> = registry.all().map(|b| b.id()).collect();
        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn test_empty_registry() {
        let registry = BroadcasterRegistry::new(Vec::new());
        assert!(registry.first_enabled().is_none());
        assert!(registry.by_id("iheartradio").is_none());
    }
}
