use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-request async mutexes. Holding a request's guard serializes every
/// read-evaluate-write sequence on that request; different requests never
/// contend. Entries are dropped once nobody holds or awaits them.
#[derive(Default)]
pub struct RequestLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl RequestLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, request_id: Uuid) -> RequestGuard<'_> {
        let lock = self
            .locks
            .entry(request_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        RequestGuard {
            locks: self,
            request_id,
            guard: Some(guard),
        }
    }

    /// Lock several requests at once. Ids are locked in sorted order so two
    /// callers can never wait on each other.
    pub async fn acquire_many(&self, mut request_ids: Vec<Uuid>) -> Vec<RequestGuard<'_>> {
        request_ids.sort_unstable();
        request_ids.dedup();

        let mut guards = Vec::with_capacity(request_ids.len());
        for id in request_ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }

    /// Number of requests with a live lock entry
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

pub struct RequestGuard<'a> {
    locks: &'a RequestLocks,
    request_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl RequestGuard<'_> {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        // Release first so the map holds the last reference when idle
        drop(self.guard.take());
        self.locks
            .locks
            .remove_if(&self.request_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
