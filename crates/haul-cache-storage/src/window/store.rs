//! Per-key fixed windows using DashMap

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;

use haul_cache_core::duration_millis;

/// Request count for one key's current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    /// Requests admitted in this window (always at least 1)
    pub count: u32,
    /// Millisecond timestamp at which the window ends
    pub reset_at: u64,
}

impl WindowEntry {
    /// A window is still active while `now <= reset_at`
    pub fn is_active_at(&self, now: u64) -> bool {
        now <= self.reset_at
    }
}

/// Decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No active window existed; a new one starts with this request
    Opened,
    /// Counted against the active window, which now holds this many requests
    Counted(u32),
    /// The active window is full
    Rejected,
}

impl Admission {
    /// Whether the request may proceed
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Admission::Rejected)
    }
}

/// Store of fixed rate-limit windows keyed by bucket name
///
/// Each key has at most one window. A request after `reset_at` replaces the
/// window; a request at or before it counts against it. Expired windows
/// are left in place until the next admission for the same key.
///
/// Cloning creates a new handle to the SAME underlying windows.
#[derive(Debug, Clone, Default)]
pub struct WindowStore {
    entries: Arc<DashMap<String, WindowEntry>>,
}

impl WindowStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit or reject a request for `key` at `now`
    ///
    /// The check and the increment happen under the key's shard lock.
    pub fn admit(&self, key: &str, max_requests: u32, window: Duration, now: u64) -> Admission {
        let fresh = WindowEntry {
            count: 1,
            reset_at: now.saturating_add(duration_millis(window)),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Admission::Opened
            }
            Entry::Occupied(mut occupied) => {
                let current = occupied.get_mut();
                if !current.is_active_at(now) {
                    *current = fresh;
                    Admission::Opened
                } else if current.count >= max_requests {
                    Admission::Rejected
                } else {
                    current.count += 1;
                    Admission::Counted(current.count)
                }
            }
        }
    }

    /// Requests left in the active window, or `max_requests` without one
    pub fn remaining(&self, key: &str, max_requests: u32, now: u64) -> u32 {
        match self.active(key, now) {
            Some(entry) => max_requests.saturating_sub(entry.count),
            None => max_requests,
        }
    }

    /// Time until `key`'s window ends, zero if there is none
    pub fn until_reset(&self, key: &str, now: u64) -> Duration {
        self.entries
            .get(key)
            .map(|entry| Duration::from_millis(entry.reset_at.saturating_sub(now)))
            .unwrap_or_default()
    }

    /// The active window for `key` at `now`, if any
    pub fn active(&self, key: &str, now: u64) -> Option<WindowEntry> {
        self.entries
            .get(key)
            .map(|entry| *entry)
            .filter(|entry| entry.is_active_at(now))
    }

    /// Drop every window
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of tracked keys, expired windows included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no key is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
