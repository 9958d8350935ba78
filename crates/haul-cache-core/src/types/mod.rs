//! Core types for cache operations

mod config;
mod entry;
mod snapshot;
mod stats;

pub use config::{CacheConfig, TtlPattern};
pub use entry::CacheEntry;
pub use snapshot::EntrySnapshot;
pub use stats::{CacheStats, format_kilobytes, format_percentage};
