//! Cache Store Module
//!
//! String-keyed map of values with per-entry expiry behind one coarse lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::warn;

use crate::cache::clock::{duration_ms, Clock, SystemClock};
use crate::cache::{CacheEntry, CacheStats};

// == Store State ==
#[derive(Debug)]
struct StoreState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

impl<V> StoreState<V> {
    fn sync_len(&mut self) {
        let len = self.entries.len();
        self.stats.set_total_entries(len);
    }
}

// == Cache Store ==
/// In-process cache with lazy TTL expiry.
///
/// `get`, `set` and `delete` all take the same mutex; there is no per-key
/// locking and no reader/writer split. None of the operations await, so a
/// blocking `std::sync::Mutex` is held only for the map access itself.
///
/// Expired entries are not swept in the background. A lookup that runs into
/// one drops it and reports a miss.
#[derive(Debug)]
pub struct CacheStore<V = String> {
    state: Mutex<StoreState<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            clock,
        }
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, StoreState<V>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(op, "Recovered from poisoned cache lock");
                poisoned.into_inner()
            }
        }
    }

    // == Get ==
    /// Returns a clone of the live value under `key`.
    ///
    /// `None` covers never-set, deleted and expired keys alike. An expired
    /// entry found here is removed before returning.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut state = self.lock("get");

        let lookup = state
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired_at(now)).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => {
                state.stats.record_hit();
                Some(value)
            }
            Some(None) => {
                state.entries.remove(key);
                state.stats.record_expiration();
                state.stats.record_miss();
                state.sync_len();
                None
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry wholesale.
    ///
    /// The entry expires at `now + ttl`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), duration_ms(ttl));
        let mut state = self.lock("set");
        state.entries.insert(key.into(), entry);
        state.sync_len();
    }

    // == Delete ==
    /// Removes the entry under `key`.
    ///
    /// Deleting an absent key is a no-op. Returns whether an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        let mut state = self.lock("delete");
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.stats.record_invalidation();
            state.sync_len();
        }
        removed
    }

    // == Discard ==
    /// Drops the entry under `key` after the caller found the value `get`
    /// returned unusable.
    ///
    /// That lookup is recounted as a miss instead of a hit, and no
    /// invalidation is recorded. Returns whether an entry was removed.
    pub fn discard(&self, key: &str) -> bool {
        let mut state = self.lock("discard");
        state.stats.reclassify_hit_as_miss();
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.sync_len();
        }
        removed
    }

    // == Contains Key ==
    /// Reports whether `key` holds a live entry without touching stats or
    /// dropping anything.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.lock("contains_key")
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Purge Expired ==
    /// Removes every expired entry and returns how many were dropped.
    ///
    /// Nothing in the crate schedules this; expiry is otherwise observed only
    /// by lookups.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.lock("purge_expired");
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - state.entries.len();
        for _ in 0..removed {
            state.stats.record_expiration();
        }
        state.sync_len();
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        self.lock("stats").stats.clone()
    }

    /// Returns the number of entries held, including expired ones not yet
    /// looked up.
    pub fn len(&self) -> usize {
        self.lock("len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const TTL: Duration = Duration::from_secs(300);

    fn manual_store() -> (Arc<ManualClock>, CacheStore) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = CacheStore::with_clock(clock.clone());
        (clock, store)
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let store = CacheStore::new();

        store.set("key1", "value1".to_string(), TTL);

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store: CacheStore = CacheStore::new();
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_delete() {
        let store = CacheStore::new();

        store.set("key1", "value1".to_string(), TTL);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_nonexistent_is_noop() {
        let store: CacheStore = CacheStore::new();

        assert!(!store.delete("nonexistent"));
        assert!(!store.delete("nonexistent"));
        assert_eq!(store.stats().invalidations, 0);
    }

    #[test]
    fn test_store_overwrite() {
        let store = CacheStore::new();

        store.set("key1", "value1".to_string(), TTL);
        store.set("key1", "value2".to_string(), TTL);

        assert_eq!(store.get("key1").as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_lazy_expiration() {
        let (clock, store) = manual_store();

        store.set("key1", "value1".to_string(), Duration::from_secs(1));
        assert!(store.get("key1").is_some());

        clock.advance(Duration::from_millis(1_100));

        // Still held until someone looks
        assert_eq!(store.len(), 1);
        assert!(!store.contains_key("key1"));
        assert_eq!(store.len(), 1);

        assert!(store.get("key1").is_none());
        assert_eq!(store.len(), 0);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_expires_exactly_at_ttl() {
        let (clock, store) = manual_store();

        store.set("key1", "value1".to_string(), Duration::from_secs(10));
        clock.advance(Duration::from_millis(9_999));
        assert!(store.get("key1").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_set_resets_expiry() {
        let (clock, store) = manual_store();

        store.set("key1", "old".to_string(), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));
        store.set("key1", "new".to_string(), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));

        assert_eq!(store.get("key1").as_deref(), Some("new"));
    }

    #[test]
    fn test_store_stats() {
        let store = CacheStore::new();

        store.set("key1", "value1".to_string(), TTL);
        store.get("key1");
        store.get("nonexistent");
        store.delete("key1");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_store_discard_recounts_hit_as_miss() {
        let store = CacheStore::new();

        store.set("key1", "garbled".to_string(), TTL);
        assert!(store.get("key1").is_some());
        assert!(store.discard("key1"));

        assert!(store.is_empty());
        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.invalidations, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_store_purge_expired() {
        let (clock, store) = manual_store();

        store.set("key1", "value1".to_string(), Duration::from_secs(1));
        store.set("key2", "value2".to_string(), Duration::from_secs(10));

        clock.advance(Duration::from_secs(2));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_store_typed_values() {
        let store: CacheStore<Vec<u32>> = CacheStore::new();

        store.set("ids", vec![1, 2, 3], TTL);
        assert_eq!(store.get("ids"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_store_concurrent_access() {
        let store = Arc::new(CacheStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("k{}", i % 16);
                        store.set(key.clone(), format!("{t}-{i}"), TTL);
                        let _ = store.get(&key);
                        if i % 5 == 0 {
                            store.delete(&key);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(store.len() <= 16);
        for i in 0..16 {
            if let Some(value) = store.get(&format!("k{i}")) {
                assert!(value.contains('-'));
            }
        }
    }
}
