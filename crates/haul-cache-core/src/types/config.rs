//! Cache configuration and TTL patterns

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::CacheError;

/// Configuration for one cache instance
///
/// Fixed once the cache is built. Unspecified fields come from
/// [`Default`]: five minute TTL, 100 entries.
///
/// ```
/// use std::time::Duration;
/// use haul_cache_core::CacheConfig;
///
/// let config = CacheConfig {
///     max_size: 10,
///     ..Default::default()
/// };
/// assert_eq!(config.default_ttl, Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Entry count at which `set` evicts the oldest entry first
    pub max_size: usize,
    /// Accepted for compatibility; values are never compressed
    pub enable_compression: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            max_size: 100,
            enable_compression: false,
        }
    }
}

impl CacheConfig {
    /// Responses from remote APIs
    pub fn api() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            max_size: 50,
            ..Default::default()
        }
    }

    /// Rarely changing content (service areas, price tables)
    pub fn static_assets() -> Self {
        Self {
            default_ttl: TtlPattern::Static.ttl(),
            max_size: 200,
            ..Default::default()
        }
    }

    /// Per-visitor data
    pub fn user() -> Self {
        Self {
            default_ttl: TtlPattern::User.ttl(),
            max_size: 100,
            ..Default::default()
        }
    }

    /// Override the default TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Override the capacity
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the compression flag (no effect on storage)
    pub fn compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

/// TTL category for pattern-based writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlPattern {
    /// 30 minutes
    Static,
    /// 10 minutes
    User,
    /// 1 minute
    Volatile,
}

impl TtlPattern {
    /// TTL for this category
    pub const fn ttl(self) -> Duration {
        match self {
            TtlPattern::Static => Duration::from_secs(30 * 60),
            TtlPattern::User => Duration::from_secs(10 * 60),
            TtlPattern::Volatile => Duration::from_secs(60),
        }
    }

    /// Get pattern as string label
    pub fn as_str(self) -> &'static str {
        match self {
            TtlPattern::Static => "static",
            TtlPattern::User => "user",
            TtlPattern::Volatile => "volatile",
        }
    }
}

impl fmt::Display for TtlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtlPattern {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(TtlPattern::Static),
            "user" => Ok(TtlPattern::User),
            "volatile" => Ok(TtlPattern::Volatile),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown ttl pattern: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_millis(300_000));
        assert_eq!(config.max_size, 100);
        assert!(!config.enable_compression);
    }

    #[test]
    fn test_presets() {
        assert_eq!(CacheConfig::api().max_size, 50);
        assert_eq!(
            CacheConfig::static_assets().default_ttl,
            Duration::from_millis(1_800_000)
        );
        assert_eq!(CacheConfig::user().default_ttl, Duration::from_millis(600_000));
    }

    #[test]
    fn test_builder_fluent() {
        let config = CacheConfig::default()
            .with_ttl(Duration::from_secs(5))
            .with_max_size(2)
            .compression(true);

        assert_eq!(config.default_ttl, Duration::from_secs(5));
        assert_eq!(config.max_size, 2);
        assert!(config.enable_compression);
    }

    #[test]
    fn test_pattern_ttls() {
        assert_eq!(TtlPattern::Static.ttl(), Duration::from_millis(1_800_000));
        assert_eq!(TtlPattern::User.ttl(), Duration::from_millis(600_000));
        assert_eq!(TtlPattern::Volatile.ttl(), Duration::from_millis(60_000));
    }

    #[test]
    fn test_pattern_parse() {
        assert_eq!("volatile".parse::<TtlPattern>().unwrap(), TtlPattern::Volatile);
        assert_eq!(TtlPattern::User.to_string(), "user");
        assert!("forever".parse::<TtlPattern>().is_err());
    }
}
