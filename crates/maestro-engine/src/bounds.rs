//! Debouncing of window bounds writes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use maestro_ipc::Bounds;

/// Coalesces rapid move/resize notifications into one write per key.
///
/// Each new notification for a key replaces the pending value and restarts
/// its quiet period.
#[derive(Debug)]
pub struct BoundsDebouncer {
    quiet: Duration,
    pending: HashMap<String, (Bounds, Instant)>,
}

impl BoundsDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: HashMap::new(),
        }
    }

    /// Record a change observed at `now`.
    pub fn record(&mut self, key: String, bounds: Bounds, now: Instant) {
        self.pending.insert(key, (bounds, now + self.quiet));
    }

    /// Remove and return every entry whose quiet period has elapsed.
    pub fn due(&mut self, now: Instant) -> Vec<(String, Bounds)> {
        let keys: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();

        keys.into_iter()
            .filter_map(|key| {
                self.pending
                    .remove(&key)
                    .map(|(bounds, _)| (key, bounds))
            })
            .collect()
    }

    /// Remove and return everything pending, due or not.
    pub fn drain(&mut self) -> Vec<(String, Bounds)> {
        self.pending
            .drain()
            .map(|(key, (bounds, _))| (key, bounds))
            .collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, deadline)| *deadline).min()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
