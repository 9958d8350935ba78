//! In-memory entry store using DashMap

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use haul_cache_core::{CacheEntry, EntrySnapshot, SharedValue};

/// Configuration for the memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Entry count at which an insert evicts the oldest entry first
    pub max_capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { max_capacity: 100 }
    }
}

impl MemoryConfig {
    /// Create config with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            max_capacity: capacity,
        }
    }
}

/// Outcome of a read
#[derive(Debug, Clone)]
pub enum Lookup<T = SharedValue> {
    /// Valid entry found
    Hit(T),
    /// Entry was past its TTL and has been removed
    Expired,
    /// No entry for the key
    Missing,
}

impl<T> Lookup<T> {
    /// Check if this is a hit
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Extract the value, consuming the lookup
    pub fn into_value(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired | Lookup::Missing => None,
        }
    }
}

/// Read-only classification of every entry at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreScan {
    /// Raw entry count
    pub total: usize,
    /// Entries still within their TTL
    pub valid: usize,
    /// Entries past their TTL
    pub expired: usize,
    /// Estimated size of the valid entries
    pub footprint_bytes: usize,
}

/// In-memory cache entry store
///
/// Expiry is lazy: reads remove the expired entry they find, and
/// [`purge_expired`](Self::purge_expired) sweeps the rest on demand. Inserts
/// are serialised so that each insert at capacity evicts exactly one entry,
/// the one with the oldest write time.
///
/// Cloning creates a new handle to the SAME underlying store.
#[derive(Clone)]
pub struct MemoryStore {
    /// Main data store
    data: Arc<DashMap<String, CacheEntry>>,
    /// Held across evict-then-insert
    write_lock: Arc<Mutex<()>>,
    /// Write order, ties on `created_at` evict the lowest
    sequence: Arc<AtomicU64>,
    /// Configuration
    config: MemoryConfig,
}

impl MemoryStore {
    /// Create a new memory store
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            data: Arc::new(DashMap::with_capacity(config.max_capacity.min(10_000))),
            write_lock: Arc::new(Mutex::new(())),
            sequence: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Create a store holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(MemoryConfig::with_capacity(capacity))
    }

    /// Store configuration
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Insert or overwrite `key`, written at `now`
    ///
    /// When the store already holds `max_capacity` entries the oldest entry
    /// is evicted first, even if `key` itself is being overwritten. Returns
    /// the evicted key.
    pub fn insert(&self, key: &str, value: SharedValue, ttl: Duration, now: u64) -> Option<String> {
        let _guard = self.write_lock.lock();

        let evicted = if self.data.len() >= self.config.max_capacity {
            self.evict_oldest()
        } else {
            None
        };

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let entry = CacheEntry::new(value, now, ttl).with_sequence(sequence);
        self.data.insert(key.to_string(), entry);

        evicted
    }

    /// Remove the entry with the oldest write time
    fn evict_oldest(&self) -> Option<String> {
        let mut oldest: Option<(String, (u64, u64))> = None;
        for item in self.data.iter() {
            let rank = (item.created_at, item.sequence);
            if oldest.as_ref().is_none_or(|(_, best)| rank < *best) {
                oldest = Some((item.key().clone(), rank));
            }
        }

        let (key, _) = oldest?;
        self.data.remove(&key);
        tracing::debug!(
            target: "haul_cache",
            key = %key,
            capacity = self.config.max_capacity,
            "Evicted oldest entry at capacity"
        );
        Some(key)
    }

    /// Read `key` at `now`, removing it if it has expired
    pub fn lookup(&self, key: &str, now: u64) -> Lookup {
        match self.data.get(key) {
            None => return Lookup::Missing,
            Some(entry) if !entry.is_expired_at(now) => return Lookup::Hit(entry.value.clone()),
            Some(_) => {}
        }
        self.take_expired(key, now)
    }

    /// Remove `key` if it is still expired at `now`
    ///
    /// Only the caller that removes the entry sees `Expired`. If another
    /// thread removed or replaced it first, the current state is returned.
    fn take_expired(&self, key: &str, now: u64) -> Lookup {
        if self
            .data
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
        {
            tracing::trace!(target: "haul_cache", key = %key, "Removed expired entry on read");
            return Lookup::Expired;
        }

        match self.data.get(key) {
            Some(entry) if !entry.is_expired_at(now) => Lookup::Hit(entry.value.clone()),
            _ => Lookup::Missing,
        }
    }

    /// Whether `key` holds a valid entry at `now`
    pub fn contains(&self, key: &str, now: u64) -> bool {
        self.lookup(key, now).is_hit()
    }

    /// Remove `key` regardless of expiry
    pub fn remove(&self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    /// Remove every entry
    pub fn clear(&self) {
        let _guard = self.write_lock.lock();
        self.data.clear();
    }

    /// Remove every entry expired at `now`, returning how many were removed
    pub fn purge_expired(&self, now: u64) -> usize {
        let mut removed = 0;
        self.data.retain(|_, entry| {
            let expired = entry.is_expired_at(now);
            if expired {
                removed += 1;
            }
            !expired
        });
        removed
    }

    /// Classify every entry at `now` without modifying the store
    pub fn scan(&self, now: u64) -> StoreScan {
        let mut scan = StoreScan::default();
        for item in self.data.iter() {
            scan.total += 1;
            if item.is_expired_at(now) {
                scan.expired += 1;
            } else {
                scan.valid += 1;
                scan.footprint_bytes += item.footprint_bytes();
            }
        }
        scan
    }

    /// Describe every entry at `now`, expired ones included
    pub fn snapshot(&self, now: u64) -> BTreeMap<String, EntrySnapshot> {
        self.data
            .iter()
            .map(|item| (item.key().clone(), EntrySnapshot::of(item.value(), now)))
            .collect()
    }

    /// Raw entry count, including expired entries not yet removed
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haul_cache_core::CacheValue;

    const MINUTE: Duration = Duration::from_secs(60);

    fn value<T: CacheValue>(v: T) -> SharedValue {
        Arc::new(v)
    }

    fn text(lookup: Lookup) -> Option<String> {
        lookup.into_value().map(|v| v.to_json().unwrap().as_str().unwrap().to_string())
    }

    #[test]
    fn test_basic_insert_lookup() {
        let store = MemoryStore::default();
        store.insert("truck", value("van"), MINUTE, 0);

        assert_eq!(text(store.lookup("truck", 10)), Some("van".to_string()));
        assert!(matches!(store.lookup("boat", 10), Lookup::Missing));
    }

    #[test]
    fn test_lazy_expiry_removes_entry() {
        let store = MemoryStore::default();
        store.insert("quote", value(1), Duration::from_millis(100), 1_000);

        assert!(store.contains("quote", 1_100));
        assert_eq!(store.len(), 1);

        assert!(matches!(store.lookup("quote", 1_101), Lookup::Expired));
        assert_eq!(store.len(), 0);
        assert!(matches!(store.lookup("quote", 1_101), Lookup::Missing));
    }

    #[test]
    fn test_expired_read_after_replace_hits() {
        let store = MemoryStore::default();
        store.insert("quote", value("stale"), Duration::from_millis(10), 0);
        // Another writer refreshes the key between the read and the removal
        store.insert("quote", value("fresh"), MINUTE, 50);

        assert_eq!(text(store.take_expired("quote", 50)), Some("fresh".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("quote");
        assert!(matches!(store.take_expired("quote", 50), Lookup::Missing));
    }

    #[test]
    fn test_concurrent_expired_reads_report_one_expiry() {
        let store = MemoryStore::default();
        store.insert("quote", value(1), Duration::from_millis(10), 0);
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    matches!(store.lookup("quote", 100), Lookup::Expired)
                })
            })
            .collect();

        let expired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|expired| *expired)
            .count();
        assert_eq!(expired, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_eviction_removes_oldest() {
        let store = MemoryStore::with_capacity(2);
        store.insert("a", value(1), MINUTE, 1);
        store.insert("b", value(2), MINUTE, 2);
        let evicted = store.insert("c", value(3), MINUTE, 3);

        assert_eq!(evicted.as_deref(), Some("a"));
        assert_eq!(store.len(), 2);
        assert!(!store.contains("a", 3));
        assert!(store.contains("b", 3));
        assert!(store.contains("c", 3));
    }

    #[test]
    fn test_eviction_tie_breaks_by_write_order() {
        let store = MemoryStore::with_capacity(3);
        store.insert("first", value(1), MINUTE, 5);
        store.insert("second", value(2), MINUTE, 5);
        store.insert("third", value(3), MINUTE, 5);

        assert_eq!(store.insert("fourth", value(4), MINUTE, 5).as_deref(), Some("first"));
        assert_eq!(store.insert("fifth", value(5), MINUTE, 5).as_deref(), Some("second"));
    }

    #[test]
    fn test_overwrite_resets_write_time() {
        let store = MemoryStore::with_capacity(2);
        store.insert("a", value(1), MINUTE, 1);
        store.insert("b", value(2), MINUTE, 2);
        // At capacity: overwriting still evicts the oldest, which is "a" itself.
        assert_eq!(store.insert("a", value(10), MINUTE, 3).as_deref(), Some("a"));
        assert_eq!(store.len(), 2);

        // "b" is now the oldest.
        assert_eq!(store.insert("c", value(3), MINUTE, 4).as_deref(), Some("b"));
        assert!(store.contains("a", 4));
        assert!(store.contains("c", 4));
    }

    #[test]
    fn test_remove_ignores_expiry() {
        let store = MemoryStore::default();
        store.insert("a", value(1), Duration::from_millis(1), 0);

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
    }

    #[test]
    fn test_purge_expired() {
        let store = MemoryStore::default();
        store.insert("short", value(1), Duration::from_millis(10), 0);
        store.insert("long", value(2), MINUTE, 0);

        assert_eq!(store.purge_expired(5), 0);
        assert_eq!(store.purge_expired(11), 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains("long", 11));
    }

    #[test]
    fn test_scan_does_not_mutate() {
        let store = MemoryStore::default();
        store.insert("short", value("x"), Duration::from_millis(10), 0);
        store.insert("long", value("y"), MINUTE, 0);

        let scan = store.scan(50);
        assert_eq!(scan.total, 2);
        assert_eq!(scan.valid, 1);
        assert_eq!(scan.expired, 1);
        assert!(scan.footprint_bytes > 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_snapshot_includes_expired() {
        let store = MemoryStore::default();
        store.insert("short", value(1), Duration::from_millis(10), 0);
        store.insert("long", value(2), MINUTE, 0);

        let snapshot = store.snapshot(30);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["short"].expires_in, -20);
        assert_eq!(snapshot["long"].expires_in, 59_970);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::default();
        store.insert("a", value(1), MINUTE, 0);
        store.insert("b", value(2), MINUTE, 0);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_data() {
        let store = MemoryStore::default();
        let handle = store.clone();
        store.insert("a", value(1), MINUTE, 0);

        assert!(handle.contains("a", 0));
    }
}
