//! haul-cache-core: Core types and traits for the haul-cache library
//!
//! This crate provides the clock, entry, configuration and statistics
//! types shared by the storage crate and the high-level services.

mod clock;
mod error;
mod traits;
mod types;

pub use clock::{duration_millis, now_millis, system_clock};
pub use tick::Clock;
#[cfg(feature = "test-util")]
pub use tick::ClockControl;
pub use error::{CacheError, Result};
pub use traits::*;
pub use types::*;
