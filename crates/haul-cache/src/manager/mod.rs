//! TTL cache service

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use haul_cache_core::{
    CacheConfig, CacheError, CacheMetrics, CacheOperation, CacheStats, CacheValue, Clock,
    EntrySnapshot, EvictionReason, NoopMetrics, Result, SharedValue, TtlPattern, downcast_value,
    format_kilobytes, format_percentage, now_millis, system_clock,
};
use haul_cache_storage::{Lookup, MemoryConfig, MemoryStore};

mod coalescer;
use coalescer::{Coalescer, Flight};

mod read_through;
pub use read_through::{CacheServiceReadThroughExt, Loader, ReadThroughCache};

/// Sweep interval for [`CacheService::spawn_cleanup`]
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

/// Operation counters
#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    writes: u64,
    deletes: u64,
    evictions: u64,
}

/// Capacity-bounded, TTL-expiring cache for values of any serialisable type
///
/// Entries expire lazily: a read that finds an expired entry removes it and
/// reports a miss. [`cleanup`](Self::cleanup) sweeps the remaining expired
/// entries but is never needed for correctness. When the cache is full,
/// [`set`](Self::set) evicts the entry with the oldest write time.
///
/// Values are stored behind `Arc` and handed back as `Arc<T>`, so a read
/// shares the stored value instead of copying it.
///
/// Cloning creates a new handle to the SAME cache. Separately constructed
/// services never share entries.
pub struct CacheService<M = NoopMetrics>
where
    M: CacheMetrics,
{
    store: MemoryStore,
    config: Arc<CacheConfig>,
    clock: Clock,
    metrics: Arc<M>,
    counters: Arc<RwLock<Counters>>,
    coalescer: Coalescer,
}

// Constructors for default metrics
impl CacheService<NoopMetrics> {
    /// Create a cache on the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Create a cache reading time from `clock`
    pub fn with_clock(config: CacheConfig, clock: Clock) -> Self {
        Self::with_metrics(config, clock, NoopMetrics)
    }
}

impl Default for CacheService<NoopMetrics> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<M> CacheService<M>
where
    M: CacheMetrics,
{
    /// Create a cache reporting to `metrics`
    pub fn with_metrics(config: CacheConfig, clock: Clock, metrics: M) -> Self {
        Self::with_shared_metrics(config, clock, Arc::new(metrics))
    }

    /// Create a cache reporting to a metrics sink shared with other caches
    pub fn with_shared_metrics(config: CacheConfig, clock: Clock, metrics: Arc<M>) -> Self {
        Self {
            store: MemoryStore::new(MemoryConfig::with_capacity(config.max_size)),
            config: Arc::new(config),
            clock,
            metrics,
            counters: Arc::new(RwLock::new(Counters::default())),
            coalescer: Coalescer::new(),
        }
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Clock used for every expiry decision
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    fn now(&self) -> u64 {
        now_millis(&self.clock)
    }

    /// Store `value` under `key`
    ///
    /// Overwrites any existing entry and restarts its TTL. `ttl` defaults to
    /// the configured default TTL.
    pub fn set<T>(&self, key: &str, value: T, ttl: Option<Duration>)
    where
        T: CacheValue,
    {
        self.insert(key, Arc::new(value), ttl);
    }

    /// Store an existing shared value; later reads return the same `Arc`
    pub fn set_shared<T>(&self, key: &str, value: Arc<T>, ttl: Option<Duration>)
    where
        T: CacheValue,
    {
        self.insert(key, value, ttl);
    }

    /// Store `value` with the TTL of `pattern`, or the default TTL for `None`
    pub fn set_with_pattern<T>(&self, key: &str, value: T, pattern: Option<TtlPattern>)
    where
        T: CacheValue,
    {
        self.set(key, value, pattern.map(TtlPattern::ttl));
    }

    /// Store `value` with the TTL named by `pattern`
    ///
    /// An unknown name falls back to the default TTL. Callers that want
    /// to reject unknown names should parse [`TtlPattern`] themselves.
    pub fn set_with_pattern_str<T>(&self, key: &str, value: T, pattern: &str)
    where
        T: CacheValue,
    {
        let parsed = pattern.parse::<TtlPattern>().ok();
        if parsed.is_none() {
            tracing::debug!(
                target: "haul_cache",
                key = %key,
                pattern = %pattern,
                "Unknown TTL pattern, using default TTL"
            );
        }
        self.set_with_pattern(key, value, parsed);
    }

    fn insert(&self, key: &str, value: SharedValue, ttl: Option<Duration>) {
        let start = Instant::now();
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        let evicted = self.store.insert(key, value, ttl, self.now());

        {
            let mut counters = self.counters.write();
            counters.writes += 1;
            if evicted.is_some() {
                counters.evictions += 1;
            }
        }
        if evicted.is_some() {
            self.metrics.record_eviction(EvictionReason::Capacity, 1);
        }
        self.metrics.record_write(key);
        self.metrics
            .record_latency(CacheOperation::Set, start.elapsed());
    }

    /// Get the stored value for `key` without naming its type
    pub fn get_value(&self, key: &str) -> Option<SharedValue> {
        let start = Instant::now();

        let value = match self.store.lookup(key, self.now()) {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired => {
                self.metrics.record_eviction(EvictionReason::Expired, 1);
                None
            }
            Lookup::Missing => None,
        };

        if value.is_some() {
            self.counters.write().hits += 1;
            self.metrics.record_hit(key);
        } else {
            self.counters.write().misses += 1;
            self.metrics.record_miss(key);
        }
        self.metrics
            .record_latency(CacheOperation::Get, start.elapsed());

        value
    }

    /// Get the value stored under `key`
    ///
    /// Returns `None` when the key is absent, expired, or holds a value of
    /// another type.
    pub fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(target: "haul_cache", key = %key, error = %e, "Typed cache read failed");
                None
            }
        }
    }

    /// Get the value stored under `key`, reporting a type mismatch as an error
    pub fn try_get<T>(&self, key: &str) -> Result<Option<Arc<T>>>
    where
        T: Send + Sync + 'static,
    {
        let Some(value) = self.get_value(key) else {
            return Ok(None);
        };

        downcast_value::<T>(value)
            .map(Some)
            .map_err(|found| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
                found: found.type_name(),
            })
    }

    /// Check whether `key` holds a valid entry
    ///
    /// Removes the entry if it has expired.
    pub fn has(&self, key: &str) -> bool {
        match self.store.lookup(key, self.now()) {
            Lookup::Hit(_) => true,
            Lookup::Expired => {
                self.metrics.record_eviction(EvictionReason::Expired, 1);
                false
            }
            Lookup::Missing => false,
        }
    }

    /// Remove `key` whether or not it has expired
    ///
    /// Returns `true` if an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        let start = Instant::now();
        let removed = self.store.remove(key);

        if removed {
            self.counters.write().deletes += 1;
            self.metrics.record_eviction(EvictionReason::Invalidated, 1);
        }
        self.metrics
            .record_latency(CacheOperation::Delete, start.elapsed());
        removed
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Return the cached value for `key`, or fetch and store it
    ///
    /// `fetcher` is called at most once, and only on a miss. An error from
    /// `fetcher` is returned unchanged and nothing is cached, so the next
    /// call fetches again.
    ///
    /// Concurrent callers that miss on the same key each run their own
    /// fetcher and the last write wins. Use
    /// [`get_or_set_coalesced`](Self::get_or_set_coalesced) to share one fetch.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<Arc<T>, E>
    where
        T: CacheValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            return Ok(hit);
        }
        self.fetch_and_store(key, fetcher, ttl).await
    }

    /// Like [`get_or_set`](Self::get_or_set), but concurrent misses on the
    /// same key share a single fetch
    ///
    /// Followers wait for the leading fetch to finish and then read the
    /// cache. If the leader failed or was cancelled, each follower runs its
    /// own fetcher.
    pub async fn get_or_set_coalesced<T, E, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<Arc<T>, E>
    where
        T: CacheValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            return Ok(hit);
        }

        match self.coalescer.join(key) {
            Flight::Leader(guard) => {
                // Another leader may have stored the value since our read.
                if let Some(hit) = self.get::<T>(key) {
                    return Ok(hit);
                }
                let result = self.fetch_and_store(key, fetcher, ttl).await;
                drop(guard);
                result
            }
            Flight::Follower(mut done) => {
                // A closed channel means the leader was dropped mid-fetch.
                let _ = done.recv().await;
                if let Some(hit) = self.get::<T>(key) {
                    return Ok(hit);
                }
                self.fetch_and_store(key, fetcher, ttl).await
            }
        }
    }

    async fn fetch_and_store<T, E, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<Arc<T>, E>
    where
        T: CacheValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let start = Instant::now();
        let result = fetcher().await;
        self.metrics
            .record_latency(CacheOperation::Fetch, start.elapsed());

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                self.insert(key, value.clone(), ttl);
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(target: "haul_cache", key = %key, "Fetch failed, nothing cached");
                Err(e)
            }
        }
    }

    /// Remove every expired entry now
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let start = Instant::now();
        let removed = self.store.purge_expired(self.now());

        if removed > 0 {
            tracing::debug!(target: "haul_cache", removed, "Swept expired entries");
            self.metrics
                .record_eviction(EvictionReason::Expired, removed as u64);
        }
        self.metrics
            .record_latency(CacheOperation::Cleanup, start.elapsed());
        removed
    }

    /// Run [`cleanup`](Self::cleanup) every `every` on the current tokio runtime
    ///
    /// The task runs until the returned handle is aborted. Must be called
    /// from within a tokio runtime.
    pub fn spawn_cleanup(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every.max(Duration::from_millis(1)));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                cache.cleanup();
            }
        })
    }

    /// Entry counts, estimated size and operation counters
    ///
    /// Classifies entries without removing expired ones.
    pub fn stats(&self) -> CacheStats {
        let scan = self.store.scan(self.now());
        let counters = *self.counters.read();
        self.metrics.record_size(scan.total, scan.footprint_bytes);

        CacheStats {
            total_entries: scan.total,
            valid_entries: scan.valid,
            expired_entries: scan.expired,
            total_size: format_kilobytes(scan.footprint_bytes),
            health_ratio: format_percentage(scan.valid, scan.total),
            memory_bytes: scan.footprint_bytes,
            hits: counters.hits,
            misses: counters.misses,
            writes: counters.writes,
            deletes: counters.deletes,
            evictions: counters.evictions,
        }
    }

    /// Every entry with its age and remaining TTL, expired entries included
    pub fn export(&self) -> BTreeMap<String, EntrySnapshot> {
        self.store.snapshot(self.now())
    }

    /// [`export`](Self::export) as JSON
    ///
    /// Values that cannot be serialised appear as `null`.
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.export()).unwrap_or(serde_json::Value::Null)
    }

    /// Raw entry count, including expired entries not yet removed
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<M> Clone for CacheService<M>
where
    M: CacheMetrics,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            metrics: self.metrics.clone(),
            counters: self.counters.clone(),
            coalescer: self.coalescer.clone(),
        }
    }
}
