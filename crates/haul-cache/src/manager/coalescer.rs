use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// In-flight table for single-flight fetches
///
/// The first caller for a key becomes the leader and holds a [`FlightGuard`].
/// Later callers subscribe and are woken when the guard drops, whether the
/// leader stored a value, failed, or was cancelled.
#[derive(Clone, Default)]
pub(crate) struct Coalescer {
    // Map key -> (flight id, completion channel)
    inflight: Arc<DashMap<String, (u64, broadcast::Sender<()>)>>,
    next_flight: Arc<AtomicU64>,
}

pub(crate) enum Flight {
    Leader(FlightGuard),
    Follower(broadcast::Receiver<()>),
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the flight for `key`, becoming its leader if none is running
    pub fn join(&self, key: &str) -> Flight {
        // The entry holds the shard lock, so subscription and removal
        // cannot interleave.
        match self.inflight.entry(key.to_string()) {
            Entry::Occupied(occupied) => Flight::Follower(occupied.get().1.subscribe()),
            Entry::Vacant(vacant) => {
                let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                let (tx, _rx) = broadcast::channel(1);
                vacant.insert((id, tx.clone()));
                Flight::Leader(FlightGuard {
                    key: key.to_string(),
                    id,
                    tx,
                    inflight: Arc::clone(&self.inflight),
                })
            }
        }
    }

    /// Number of keys with a running flight
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }
}

/// Leadership of one flight; completion is signalled on drop
pub(crate) struct FlightGuard {
    key: String,
    id: u64,
    tx: broadcast::Sender<()>,
    inflight: Arc<DashMap<String, (u64, broadcast::Sender<()>)>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.inflight
            .remove_if(&self.key, |_, (id, _)| *id == self.id);
        // No receivers is fine.
        let _ = self.tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_caller_leads() {
        let coalescer = Coalescer::new();

        let leader = coalescer.join("quote");
        assert!(matches!(leader, Flight::Leader(_)));
        assert_eq!(coalescer.in_flight(), 1);

        let follower = coalescer.join("quote");
        let Flight::Follower(mut rx) = follower else {
            panic!("Expected follower");
        };

        drop(leader);
        assert!(rx.recv().await.is_ok());
        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_keys_fly_separately() {
        let coalescer = Coalescer::new();

        let a = coalescer.join("a");
        let b = coalescer.join("b");
        assert!(matches!(a, Flight::Leader(_)));
        assert!(matches!(b, Flight::Leader(_)));
        assert_eq!(coalescer.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_new_leader_after_completion() {
        let coalescer = Coalescer::new();
        drop(coalescer.join("a"));

        assert!(matches!(coalescer.join("a"), Flight::Leader(_)));
    }
}
