//! Type-erased cache values

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::{CacheError, Result};

/// A value that can live in a heterogeneous cache
///
/// Implemented for every `Serialize + Send + Sync + 'static` type. Values are
/// stored as [`SharedValue`] and recovered with [`downcast_value`].
pub trait CacheValue: Any + Send + Sync {
    /// Upcast for downcasting back to the concrete type
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Name of the concrete type (for diagnostics)
    fn type_name(&self) -> &'static str;

    /// JSON form of the value, used for size estimates and debug dumps
    fn to_json(&self) -> Result<serde_json::Value>;
}

impl<T> CacheValue for T
where
    T: Serialize + Send + Sync + 'static,
{
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| CacheError::Serialization(e.to_string()))
    }
}

impl fmt::Debug for dyn CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheValue<{}>", self.type_name())
    }
}

/// Shared handle to a stored value
pub type SharedValue = Arc<dyn CacheValue>;

/// Recover the concrete type of a stored value
///
/// Returns the original handle on mismatch so the caller can report it.
pub fn downcast_value<T>(value: SharedValue) -> std::result::Result<Arc<T>, SharedValue>
where
    T: Send + Sync + 'static,
{
    Arc::clone(&value).into_any().downcast::<T>().map_err(|_| value)
}
