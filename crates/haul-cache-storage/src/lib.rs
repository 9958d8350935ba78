//! haul-cache-storage: In-memory stores for haul-cache
//!
//! [`MemoryStore`] holds cache entries with lazy expiry and capacity
//! eviction. [`WindowStore`] holds fixed rate-limit windows.

pub mod memory;
pub mod window;

pub use memory::{Lookup, MemoryConfig, MemoryStore, StoreScan};
pub use window::{Admission, WindowEntry, WindowStore};
