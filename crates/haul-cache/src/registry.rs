//! Named cache instances

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use haul_cache_core::{CacheConfig, CacheMetrics, CacheStats, Clock, NoopMetrics, system_clock};

use crate::CacheService;

/// The application's cache instances, one per kind of data
///
/// Each instance has its own entries and capacity; writing to `api` never
/// evicts from `user`. Build one `Caches` at startup and pass clones around.
pub struct Caches<M = NoopMetrics>
where
    M: CacheMetrics,
{
    /// Remote API responses, see [`CacheConfig::api`]
    pub api: CacheService<M>,
    /// Rarely changing content, see [`CacheConfig::static_assets`]
    pub static_assets: CacheService<M>,
    /// Per-visitor data, see [`CacheConfig::user`]
    pub user: CacheService<M>,
    /// Everything else, with [`CacheConfig::default`]
    pub default: CacheService<M>,
}

impl Caches<NoopMetrics> {
    /// Build every instance on `clock`
    pub fn new(clock: Clock) -> Self {
        Self::with_metrics(clock, NoopMetrics)
    }
}

impl Default for Caches<NoopMetrics> {
    fn default() -> Self {
        Self::new(system_clock())
    }
}

impl<M> Caches<M>
where
    M: CacheMetrics,
{
    /// Build every instance on `clock`, all reporting to `metrics`
    pub fn with_metrics(clock: Clock, metrics: M) -> Self {
        let metrics = Arc::new(metrics);
        let build = |config: CacheConfig| {
            CacheService::with_shared_metrics(config, clock.clone(), metrics.clone())
        };

        Self {
            api: build(CacheConfig::api()),
            static_assets: build(CacheConfig::static_assets()),
            user: build(CacheConfig::user()),
            default: build(CacheConfig::default()),
        }
    }

    /// Every instance with its name
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CacheService<M>)> {
        [
            ("api", &self.api),
            ("static", &self.static_assets),
            ("user", &self.user),
            ("default", &self.default),
        ]
        .into_iter()
    }

    /// Sweep expired entries from every instance
    pub fn cleanup_all(&self) -> usize {
        self.iter().map(|(_, cache)| cache.cleanup()).sum()
    }

    /// Remove every entry from every instance
    pub fn clear_all(&self) {
        for (_, cache) in self.iter() {
            cache.clear();
        }
    }

    /// Stats for every instance, keyed by name
    pub fn stats(&self) -> Vec<(&'static str, CacheStats)> {
        self.iter()
            .map(|(name, cache)| (name, cache.stats()))
            .collect()
    }

    /// Start a cleanup task for every instance
    pub fn spawn_cleanup(&self, every: Duration) -> Vec<JoinHandle<()>> {
        self.iter()
            .map(|(_, cache)| cache.spawn_cleanup(every))
            .collect()
    }
}

impl<M> Clone for Caches<M>
where
    M: CacheMetrics,
{
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            static_assets: self.static_assets.clone(),
            user: self.user.clone(),
            default: self.default.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tick::ClockControl;

    #[test]
    fn test_instances_use_presets() {
        let caches = Caches::new(ClockControl::new().to_clock());

        assert_eq!(caches.api.config().max_size, 50);
        assert_eq!(caches.static_assets.config().max_size, 200);
        assert_eq!(caches.user.config().default_ttl, Duration::from_secs(600));
        assert_eq!(caches.default.config(), &CacheConfig::default());
    }

    #[test]
    fn test_instances_are_isolated() {
        let caches = Caches::new(ClockControl::new().to_clock());
        caches.api.set("postcode:LS1", "Leeds".to_string(), None);

        assert!(caches.api.has("postcode:LS1"));
        assert!(!caches.user.has("postcode:LS1"));
        assert!(!caches.default.has("postcode:LS1"));
    }

    #[test]
    fn test_cleanup_all_and_clear_all() {
        let control = ClockControl::new();
        let caches = Caches::new(control.to_clock());
        caches.api.set("a", 1u8, Some(Duration::from_millis(5)));
        caches.user.set("b", 1u8, Some(Duration::from_millis(5)));
        caches.default.set("c", 1u8, None);

        control.advance_millis(6);
        assert_eq!(caches.cleanup_all(), 2);

        caches.clear_all();
        assert!(caches.iter().all(|(_, cache)| cache.is_empty()));
    }

    #[test]
    fn test_stats_by_name() {
        let caches = Caches::new(ClockControl::new().to_clock());
        caches.static_assets.set("areas", vec!["north"], None);

        let stats = caches.stats();
        let names: Vec<_> = stats.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["api", "static", "user", "default"]);
        assert_eq!(stats[1].1.total_entries, 1);
    }

    #[test]
    fn test_clones_share_instances() {
        let caches = Caches::new(ClockControl::new().to_clock());
        let handle = caches.clone();
        handle.user.set("session", 7u32, None);

        assert_eq!(caches.user.get::<u32>("session").as_deref(), Some(&7));
    }
}
