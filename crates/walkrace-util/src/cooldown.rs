//! Per-key cooldown tracking

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::MonotonicInstant;

/// Remembers when each key last fired so callers can throttle it.
///
/// The window is supplied per check rather than fixed at construction, so
/// callers may randomize it on every call.
#[derive(Debug)]
pub struct CooldownTracker<K> {
    last_fired: HashMap<K, MonotonicInstant>,
}

impl<K: Eq + Hash + Clone> CooldownTracker<K> {
    pub fn new() -> Self {
        Self {
            last_fired: HashMap::new(),
        }
    }

    /// Whether `key` may fire at `now` given a cooldown `window`.
    ///
    /// A key that never fired is always ready.
    pub fn is_ready(&self, key: &K, now: MonotonicInstant, window: Duration) -> bool {
        match self.last_fired.get(key) {
            Some(last) => now.duration_since(*last) >= window,
            None => true,
        }
    }

    /// Record that `key` fired at `now`
    pub fn mark_fired(&mut self, key: &K, now: MonotonicInstant) {
        self.last_fired.insert(key.clone(), now);
    }

    /// When `key` last fired, if ever
    pub fn last_fired(&self, key: &K) -> Option<MonotonicInstant> {
        self.last_fired.get(key).copied()
    }

    /// Forget every key
    pub fn clear(&mut self) {
        self.last_fired.clear();
    }
}

impl<K: Eq + Hash + Clone> Default for CooldownTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
