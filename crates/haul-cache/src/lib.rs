//! haul-cache: in-memory TTL caching and rate limiting for a quoting service
//!
//! # Features
//!
//! - **TTL caches** with lazy expiry and oldest-first capacity eviction
//! - **Named instances** (`api`, `static_assets`, `user`, `default`)
//! - **Get-or-fetch**, optionally coalesced into a single fetch per key
//! - **Fixed-window rate limiting** with lead, chat and API presets
//! - **Metrics integration** through `tracing` or the `metrics` crate
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use haul_cache::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let caches = Caches::default();
//!
//!     caches.api.set("quote:42", 1250u32, Some(Duration::from_secs(60)));
//!     assert_eq!(caches.api.get::<u32>("quote:42").as_deref(), Some(&1250));
//!
//!     let areas = caches
//!         .static_assets
//!         .get_or_set("areas", || async { Ok::<_, std::io::Error>(vec!["north", "south"]) }, None)
//!         .await?;
//!     println!("Serving {} areas", areas.len());
//!
//!     let limiter = RateLimitService::new();
//!     let status = limiter.check_lead_submission();
//!     if !status.allowed {
//!         println!("Try again in {}s", status.reset_in);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod limiter;
mod manager;
mod registry;

// Re-export core
pub use haul_cache_core::*;

// Re-export storage
pub use haul_cache_storage::{MemoryConfig, MemoryStore, WindowStore};

// Export services
pub use limiter::{RateLimitConfig, RateLimitService, RateLimitStatus};
pub use manager::{
    CacheService, CacheServiceReadThroughExt, DEFAULT_CLEANUP_INTERVAL, Loader, ReadThroughCache,
};
pub use registry::Caches;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CacheConfig, CacheError, CacheService, CacheServiceReadThroughExt, CacheStats, Caches,
        Clock, Loader, RateLimitConfig, RateLimitService, RateLimitStatus,
        ReadThroughCache, Result, TtlPattern,
    };

    #[cfg(feature = "test-util")]
    pub use crate::ClockControl;
}
