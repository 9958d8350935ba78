use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use haul_cache_core::{CacheMetrics, CacheValue, NoopMetrics};

use super::CacheService;

/// Source of values for a [`ReadThroughCache`]
#[async_trait]
pub trait Loader<V>: Send + Sync + 'static {
    /// Error returned when the source cannot produce a value
    type Error: Send;

    /// Load the value for `key`
    async fn load(&self, key: &str) -> Result<V, Self::Error>;
}

/// A cache wrapper that loads missing values from a [`Loader`]
pub struct ReadThroughCache<V, L, M = NoopMetrics>
where
    M: CacheMetrics,
{
    cache: CacheService<M>,
    loader: Arc<L>,
    ttl: Option<Duration>,
    coalesce: bool,
    _value: PhantomData<fn() -> V>,
}

impl<V, L, M> ReadThroughCache<V, L, M>
where
    V: CacheValue,
    L: Loader<V>,
    M: CacheMetrics,
{
    /// Wrap `cache`, storing loaded values with the cache's default TTL
    pub fn new(cache: CacheService<M>, loader: L) -> Self {
        Self {
            cache,
            loader: Arc::new(loader),
            ttl: None,
            coalesce: false,
            _value: PhantomData,
        }
    }

    /// Store loaded values with `ttl`
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Share one load between concurrent misses on the same key
    pub fn coalesced(mut self) -> Self {
        self.coalesce = true;
        self
    }

    /// Get the cached value, loading it on a miss
    pub async fn get(&self, key: &str) -> Result<Arc<V>, L::Error> {
        let loader = &self.loader;
        if self.coalesce {
            self.cache
                .get_or_set_coalesced(key, || loader.load(key), self.ttl)
                .await
        } else {
            self.cache
                .get_or_set(key, || loader.load(key), self.ttl)
                .await
        }
    }

    /// Load `key` unconditionally and overwrite the cached value
    pub async fn refresh(&self, key: &str) -> Result<Arc<V>, L::Error> {
        let value = Arc::new(self.loader.load(key).await?);
        self.cache.set_shared(key, value.clone(), self.ttl);
        Ok(value)
    }

    /// Drop the cached value so the next [`get`](Self::get) loads again
    pub fn invalidate(&self, key: &str) -> bool {
        self.cache.delete(key)
    }

    /// Underlying cache
    pub fn cache(&self) -> &CacheService<M> {
        &self.cache
    }
}

/// Build a [`ReadThroughCache`] from a [`CacheService`]
pub trait CacheServiceReadThroughExt<M>
where
    M: CacheMetrics,
{
    /// Wrap this cache with `loader`
    fn read_through<V, L>(self, loader: L) -> ReadThroughCache<V, L, M>
    where
        V: CacheValue,
        L: Loader<V>;
}

impl<M> CacheServiceReadThroughExt<M> for CacheService<M>
where
    M: CacheMetrics,
{
    fn read_through<V, L>(self, loader: L) -> ReadThroughCache<V, L, M>
    where
        V: CacheValue,
        L: Loader<V>,
    {
        ReadThroughCache::new(self, loader)
    }
}
