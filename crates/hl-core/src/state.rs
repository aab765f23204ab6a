use crate::types::{UiEntry, UiStateMap};
use std::sync::{Arc, Mutex, PoisonError};

/// Sequence number handed to a poll before it fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollTicket(u64);

impl PollTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct Inner {
    map: UiStateMap,
    issued: u64,
    applied: u64,
}

/// The UI state map of one screen, shared by its poller and submitter.
///
/// Responses are ordered by when their poll was issued, not by when they
/// arrive: a poll result is applied only if its ticket is newer than the
/// last applied one.
#[derive(Debug, Clone, Default)]
pub struct UiStateStore {
    inner: Arc<Mutex<Inner>>,
}

impl UiStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_poll(&self) -> PollTicket {
        let mut inner = self.lock();
        inner.issued += 1;
        PollTicket(inner.issued)
    }

    /// Replaces the map with `map` unless a newer poll was already applied.
    pub fn apply_poll(&self, ticket: PollTicket, map: UiStateMap) -> bool {
        let mut inner = self.lock();
        if ticket.0 <= inner.applied {
            return false;
        }
        inner.map = map;
        inner.applied = ticket.0;
        true
    }

    /// Optimistically marks `target_id` pending after a successful submit.
    ///
    /// Polls issued before this point predate the new request, so their
    /// responses are discarded when they arrive.
    pub fn mark_pending(&self, target_id: &str) {
        let mut inner = self.lock();
        inner.map.insert(target_id, UiEntry::pending());
        inner.applied = inner.issued;
    }

    /// Seeds the map from a cached mirror if no poll has been applied yet.
    pub fn seed(&self, map: UiStateMap) -> bool {
        let mut inner = self.lock();
        if inner.applied > 0 || !inner.map.is_empty() {
            return false;
        }
        inner.map = map;
        true
    }

    pub fn snapshot(&self) -> UiStateMap {
        self.lock().map.clone()
    }

    pub fn get(&self, target_id: &str) -> Option<UiEntry> {
        self.lock().map.get(target_id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
