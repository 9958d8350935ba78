//! Core traits for cache values and observability

mod metrics;
mod tracing;
mod value;

pub use metrics::{CacheMetrics, CacheOperation, EvictionReason, NoopMetrics};
pub use tracing::TracingMetrics;
pub use value::{CacheValue, SharedValue, downcast_value};

#[cfg(feature = "metrics")]
pub use metrics::MetricsCrateAdapter;
