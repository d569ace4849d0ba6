//! Time-boxed memo for lookup results.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Map from lookup arguments to `(result, insertion time)`.
///
/// Entries older than `ttl` are treated as absent and dropped on access.
/// Callers pass `now` explicitly so expiry is deterministic under test.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (V, Instant)>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Cached value for `key`, if it was inserted less than `ttl` before `now`.
    pub fn get(&mut self, key: &K, now: Instant) -> Option<V> {
        let fresh = match self.entries.get(key) {
            Some((_, inserted)) => now.saturating_duration_since(*inserted) < self.ttl,
            None => return None,
        };
        if fresh {
            self.entries.get(key).map(|(v, _)| v.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (value, now));
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, (_, inserted)| now.saturating_duration_since(*inserted) < ttl);
        before - self.entries.len()
    }
}
