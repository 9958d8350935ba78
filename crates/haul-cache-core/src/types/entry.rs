//! Cache entry type

use std::time::Duration;

use crate::clock::duration_millis;
use crate::traits::SharedValue;

/// A cached entry with its timing metadata
///
/// Timestamps are milliseconds since the Unix epoch as read from a
/// [`Clock`](crate::Clock). An entry is valid while
/// `now - created_at <= ttl`; a zero TTL is expired on every read.
#[derive(Debug, Clone)]
pub struct CacheEntry<T = SharedValue> {
    /// The cached value
    pub value: T,
    /// When the entry was written
    pub created_at: u64,
    /// Time-to-live
    pub ttl: Duration,
    /// Store-wide write counter, breaks `created_at` ties on eviction
    pub sequence: u64,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry
    pub fn new(value: T, created_at: u64, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            ttl,
            sequence: 0,
        }
    }

    /// Set the write sequence number
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// TTL in whole milliseconds
    pub fn ttl_millis(&self) -> u64 {
        duration_millis(self.ttl)
    }

    /// Check if the entry has expired at `now`
    pub fn is_expired_at(&self, now: u64) -> bool {
        let ttl = self.ttl_millis();
        ttl == 0 || now.saturating_sub(self.created_at) > ttl
    }

    /// Age of the entry at `now`
    pub fn age_at(&self, now: u64) -> Duration {
        Duration::from_millis(now.saturating_sub(self.created_at))
    }

    /// Milliseconds until expiry; negative once overdue
    pub fn expires_in_at(&self, now: u64) -> i64 {
        let age = i128::from(now) - i128::from(self.created_at);
        let remaining = i128::from(self.ttl_millis()) - age;
        remaining.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// Whether this entry should be evicted before `other`
    pub fn is_older_than<U>(&self, other: &CacheEntry<U>) -> bool {
        (self.created_at, self.sequence) < (other.created_at, other.sequence)
    }
}

impl CacheEntry<SharedValue> {
    /// Approximate in-memory footprint in bytes
    ///
    /// Serialises the entry to JSON and counts two bytes per UTF-16 code
    /// unit. Values that fail to serialise count as zero.
    pub fn footprint_bytes(&self) -> usize {
        let data = match self.value.to_json() {
            Ok(data) => data,
            Err(e) => {
                tracing::trace!(
                    target: "haul_cache",
                    value_type = self.value.type_name(),
                    error = %e,
                    "Skipping unserialisable value in size estimate"
                );
                return 0;
            }
        };

        let document = serde_json::json!({
            "data": data,
            "timestamp": self.created_at,
            "ttl": self.ttl_millis(),
        });

        document.to_string().encode_utf16().count() * 2
    }
}
