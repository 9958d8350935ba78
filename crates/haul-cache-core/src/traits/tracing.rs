use crate::{CacheMetrics, CacheOperation, EvictionReason};
use std::time::Duration;
use tracing::debug;

/// Metrics adapter that logs events via `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingMetrics {
    /// Cache instance name (optional)
    cache_name: Option<String>,
}

impl TracingMetrics {
    /// Create new tracing metrics adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Label events with the owning cache instance
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = Some(name.into());
        self
    }
}

impl CacheMetrics for TracingMetrics {
    fn record_hit(&self, key: &str) {
        debug!(
            target: "haul_cache",
            event = "hit",
            key = %key,
            cache = ?self.cache_name,
            "Cache Hit"
        );
    }

    fn record_miss(&self, key: &str) {
        debug!(
            target: "haul_cache",
            event = "miss",
            key = %key,
            cache = ?self.cache_name,
            "Cache Miss"
        );
    }

    fn record_write(&self, key: &str) {
        tracing::trace!(
            target: "haul_cache",
            event = "write",
            key = %key,
            cache = ?self.cache_name,
            "Cache Write"
        );
    }

    fn record_latency(&self, operation: CacheOperation, duration: Duration) {
        tracing::trace!(
            target: "haul_cache",
            event = "latency",
            operation = operation.as_str(),
            duration_ms = duration.as_millis(),
            cache = ?self.cache_name,
            "Cache Operation Latency"
        );
    }

    fn record_eviction(&self, reason: EvictionReason, count: u64) {
        debug!(
            target: "haul_cache",
            event = "eviction",
            reason = reason.as_str(),
            count = count,
            cache = ?self.cache_name,
            "Cache Eviction"
        );
    }

    fn record_size(&self, entries: usize, memory_bytes: usize) {
        tracing::trace!(
            target: "haul_cache",
            event = "size",
            entries = entries,
            bytes = memory_bytes,
            cache = ?self.cache_name,
            "Cache Size Update"
        );
    }
}
