//! Metrics trait for cache observability

use std::time::Duration;

/// Cache operation for latency tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOperation {
    Get,
    Set,
    Delete,
    Fetch,
    Cleanup,
}

impl CacheOperation {
    /// Get operation as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOperation::Get => "get",
            CacheOperation::Set => "set",
            CacheOperation::Delete => "delete",
            CacheOperation::Fetch => "fetch",
            CacheOperation::Cleanup => "cleanup",
        }
    }
}

/// Reason an entry left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// TTL expired (lazy read or cleanup sweep)
    Expired,
    /// Capacity limit reached
    Capacity,
    /// Explicitly deleted
    Invalidated,
}

impl EvictionReason {
    /// Get reason as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionReason::Expired => "expired",
            EvictionReason::Capacity => "capacity",
            EvictionReason::Invalidated => "invalidated",
        }
    }
}

/// Trait for cache metrics/observability
///
/// Implement this to integrate with your metrics system (Prometheus, StatsD, etc.)
pub trait CacheMetrics: Send + Sync + 'static {
    /// Record a cache hit
    fn record_hit(&self, key: &str);

    /// Record a cache miss
    fn record_miss(&self, key: &str);

    /// Record a write
    fn record_write(&self, key: &str);

    /// Record operation latency
    fn record_latency(&self, operation: CacheOperation, duration: Duration);

    /// Record entries leaving the cache
    fn record_eviction(&self, reason: EvictionReason, count: u64);

    /// Record cache size
    fn record_size(&self, entries: usize, memory_bytes: usize);
}

/// No-op metrics implementation (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl CacheMetrics for NoopMetrics {
    #[inline]
    fn record_hit(&self, _key: &str) {}

    #[inline]
    fn record_miss(&self, _key: &str) {}

    #[inline]
    fn record_write(&self, _key: &str) {}

    #[inline]
    fn record_latency(&self, _operation: CacheOperation, _duration: Duration) {}

    #[inline]
    fn record_eviction(&self, _reason: EvictionReason, _count: u64) {}

    #[inline]
    fn record_size(&self, _entries: usize, _memory_bytes: usize) {}
}

/// Metrics adapter using the `metrics` crate
///
/// # Example
/// ```ignore
/// use haul_cache_core::MetricsCrateAdapter;
///
/// let metrics = MetricsCrateAdapter::new("quote_cache");
/// // Emits: quote_cache_hits_total, quote_cache_misses_total, etc.
/// ```
#[cfg(feature = "metrics")]
#[derive(Debug, Clone)]
pub struct MetricsCrateAdapter {
    prefix: String,
}

#[cfg(feature = "metrics")]
impl MetricsCrateAdapter {
    /// Create a new adapter with the given metric name prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn metric_name(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

#[cfg(feature = "metrics")]
impl CacheMetrics for MetricsCrateAdapter {
    fn record_hit(&self, _key: &str) {
        metrics::counter!(self.metric_name("hits_total")).increment(1);
    }

    fn record_miss(&self, _key: &str) {
        metrics::counter!(self.metric_name("misses_total")).increment(1);
    }

    fn record_write(&self, _key: &str) {
        metrics::counter!(self.metric_name("writes_total")).increment(1);
    }

    fn record_latency(&self, operation: CacheOperation, duration: Duration) {
        metrics::histogram!(
            self.metric_name("operation_duration_seconds"),
            "operation" => operation.as_str()
        )
        .record(duration.as_secs_f64());
    }

    fn record_eviction(&self, reason: EvictionReason, count: u64) {
        metrics::counter!(
            self.metric_name("evictions_total"),
            "reason" => reason.as_str()
        )
        .increment(count);
    }

    fn record_size(&self, entries: usize, memory_bytes: usize) {
        metrics::gauge!(self.metric_name("entries")).set(entries as f64);
        metrics::gauge!(self.metric_name("memory_bytes")).set(memory_bytes as f64);
    }
}
