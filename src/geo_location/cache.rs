//! Bounded, single-flight geolocation cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use super::response::GeoRecord;

pub const DEFAULT_CAPACITY: usize = 10_000;

type Slot = Arc<OnceCell<GeoRecord>>;

struct Entry {
    slot: Slot,
    last_used: u64,
}

struct Entries {
    map: HashMap<String, Entry>,
    clock: u64,
}

/// Address-keyed cache of geolocation results.
///
/// Each key owns a slot that is filled at most once. The mutex only guards
/// the map itself; callers await slot initialisation outside of it, so a slow
/// upstream never blocks lookups for other addresses. When full, the least
/// recently used key is evicted.
pub struct GeoCache {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl GeoCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                clock: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Returns the slot for `key`, creating it if needed.
    pub(crate) fn slot(&self, key: &str) -> Slot {
        let mut entries = self.entries.lock();
        entries.clock += 1;
        let now = entries.clock;

        if let Some(entry) = entries.map.get_mut(key) {
            entry.last_used = now;
            return entry.slot.clone();
        }

        if entries.map.len() >= self.capacity {
            let oldest = entries
                .map
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.map.remove(&oldest);
            }
        }

        let slot = Slot::default();
        entries.map.insert(
            key.to_string(),
            Entry {
                slot: slot.clone(),
                last_used: now,
            },
        );
        slot
    }

    /// Drops `key` if it still maps to `slot` and the slot was never filled.
    pub(crate) fn discard(&self, key: &str, slot: &Slot) {
        let mut entries = self.entries.lock();
        let stale = entries
            .map
            .get(key)
            .is_some_and(|e| Arc::ptr_eq(&e.slot, slot) && !e.slot.initialized());
        if stale {
            entries.map.remove(key);
        }
    }

    /// Cached record for `key`, if one has been resolved.
    pub fn get(&self, key: &str) -> Option<GeoRecord> {
        let entries = self.entries.lock();
        entries.map.get(key).and_then(|e| e.slot.get().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GeoCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
