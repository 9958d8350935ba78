//! Debug snapshots of cache entries

use serde::{Serialize, Serializer};
use std::time::Duration;

use super::entry::CacheEntry;
use crate::clock::duration_millis;
use crate::traits::SharedValue;

/// One entry of a cache export, expired entries included
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    /// The stored value
    #[serde(rename = "data", serialize_with = "value_as_json")]
    pub value: SharedValue,
    /// Time since the entry was written
    #[serde(serialize_with = "as_millis")]
    pub age: Duration,
    /// TTL the entry was written with
    #[serde(serialize_with = "as_millis")]
    pub ttl: Duration,
    /// `ttl - age` in milliseconds, negative once overdue
    pub expires_in: i64,
}

impl EntrySnapshot {
    /// Describe `entry` as seen at `now`
    pub fn of(entry: &CacheEntry<SharedValue>, now: u64) -> Self {
        Self {
            value: entry.value.clone(),
            age: entry.age_at(now),
            ttl: entry.ttl,
            expires_in: entry.expires_in_at(now),
        }
    }

    /// Whether the entry was past its TTL when captured
    pub fn is_overdue(&self) -> bool {
        self.expires_in < 0
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration_millis(*duration))
}

fn value_as_json<S: Serializer>(value: &SharedValue, serializer: S) -> Result<S::Ok, S::Error> {
    match value.to_json() {
        Ok(json) => json.serialize(serializer),
        Err(_) => serializer.serialize_none(),
    }
}
