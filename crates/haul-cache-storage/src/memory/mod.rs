//! In-memory cache entry store

mod store;

pub use store::{Lookup, MemoryConfig, MemoryStore, StoreScan};
