//! Pending waiters per in-flight key, and delivery of the final outcome.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{info, trace, warn};

use crate::data::{Outcome, ResourceKey, WaiterToken};

/// Waiters registered against one in-flight key.
///
/// Present in the table exactly while that key's pipeline runs.
pub(crate) struct PendingEntry {
    waiters: Vec<(WaiterToken, oneshot::Sender<Outcome>)>,
}

impl PendingEntry {
    fn contains(&self, token: WaiterToken) -> bool { self.waiters.iter().any(|(t, _)| *t == token) }
}

/// Result of registering a waiter in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Registration {
    /// No entry existed; the caller must launch the pipeline.
    Created,
    /// Appended to an existing entry.
    Appended,
    /// The token was already registered; nothing changed.
    Duplicate,
}

#[derive(Default)]
pub(crate) struct PendingTable {
    entries: Mutex<HashMap<ResourceKey, PendingEntry>>,
}

impl PendingTable {
    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceKey, PendingEntry>> {
        // a panic while holding the lock cannot leave the map half-updated
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(
        &self,
        key: &ResourceKey,
        token: WaiterToken,
        sender: oneshot::Sender<Outcome>,
    ) -> Registration {
        match self.lock().entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().contains(token) {
                    return Registration::Duplicate;
                }
                occupied.get_mut().waiters.push((token, sender));
                Registration::Appended
            }
            Entry::Vacant(vacant) => {
                vacant.insert(PendingEntry {
                    waiters: vec![(token, sender)],
                });
                Registration::Created
            }
        }
    }

    fn take(&self, key: &ResourceKey) -> Option<PendingEntry> { self.lock().remove(key) }

    pub(crate) fn is_pending(&self, key: &str) -> bool { self.lock().contains_key(key) }

    pub(crate) fn waiter_count(&self, key: &str) -> usize {
        self.lock().get(key).map_or(0, |entry| entry.waiters.len())
    }

    pub(crate) fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<_> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove the entry for `key` and hand `outcome` to each of its waiters.
    ///
    /// Returns how many waiters were still listening.
    pub(crate) fn broadcast(&self, key: &ResourceKey, outcome: Outcome) -> usize {
        let Some(entry) = self.take(key) else {
            warn!(key = %key, "no pending waiters for completed retrieval");
            return 0;
        };

        info!(
            key = %key,
            waiters = entry.waiters.len(),
            success = outcome.is_ok(),
            "broadcasting export outcome"
        );

        let mut delivered = 0;
        for (token, sender) in entry.waiters {
            if sender.send(outcome.clone()).is_ok() {
                delivered += 1;
            } else {
                trace!(key = %key, %token, "waiter dropped before delivery");
            }
        }
        delivered
    }
}

/// Obligation to broadcast exactly once for a launched pipeline.
///
/// If dropped without [`Completion::finish`] (the pipeline task panicked or
/// was torn down with its runtime) the entry is still removed, so waiters
/// observe a closed channel and the key can be retrieved again.
pub(crate) struct Completion {
    table: Arc<PendingTable>,
    key:   Option<ResourceKey>,
}

impl Completion {
    pub(crate) fn new(table: Arc<PendingTable>, key: ResourceKey) -> Self {
        Self {
            table,
            key: Some(key),
        }
    }

    pub(crate) fn finish(mut self, outcome: Outcome) -> usize {
        match self.key.take() {
            Some(key) => self.table.broadcast(&key, outcome),
            None => 0,
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            warn!(key = %key, "retrieval ended without an outcome");
            drop(self.table.take(&key));
        }
    }
}

#[cfg(test)]
mod tests {
    use exportsync_archive::ExportArchive;

    use super::*;
    use crate::error::RetrieveError;

    fn key(name: &str) -> ResourceKey { ResourceKey::new(name).unwrap() }

    #[test]
    fn first_registration_creates_then_appends() {
        let table = PendingTable::default();
        let k = key("app-1");
        let (tx1, _rx1) = oneshot::channel();
        let (tx2, _rx2) = oneshot::channel();

        assert_eq!(table.register(&k, WaiterToken::new(), tx1), Registration::Created);
        assert_eq!(table.register(&k, WaiterToken::new(), tx2), Registration::Appended);
        assert_eq!(table.waiter_count("app-1"), 2);
        assert_eq!(table.keys(), vec![k]);
    }

    #[test]
    fn duplicate_token_is_not_registered_twice() {
        let table = PendingTable::default();
        let k = key("app-1");
        let token = WaiterToken::new();
        let (tx1, _rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();

        table.register(&k, token, tx1);
        assert_eq!(table.register(&k, token, tx2), Registration::Duplicate);
        assert_eq!(table.waiter_count("app-1"), 1);
        // the rejected sender was dropped
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn broadcast_delivers_same_outcome_and_clears_entry() {
        let table = PendingTable::default();
        let k = key("app-1");
        let (tx1, mut rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();
        table.register(&k, WaiterToken::new(), tx1);
        table.register(&k, WaiterToken::new(), tx2);

        let archive = Arc::new(ExportArchive::default());
        assert_eq!(table.broadcast(&k, Ok(Arc::clone(&archive))), 2);

        assert!(Arc::ptr_eq(&rx1.try_recv().unwrap().unwrap(), &archive));
        assert!(Arc::ptr_eq(&rx2.try_recv().unwrap().unwrap(), &archive));
        assert!(!table.is_pending("app-1"));
    }

    #[test]
    fn broadcast_skips_dropped_waiters() {
        let table = PendingTable::default();
        let k = key("app-1");
        let (tx1, rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();
        table.register(&k, WaiterToken::new(), tx1);
        table.register(&k, WaiterToken::new(), tx2);
        drop(rx1);

        let error = RetrieveError::Transport("timeout".to_string());
        assert_eq!(table.broadcast(&k, Err(error.clone())), 1);
        assert_eq!(rx2.try_recv().unwrap().unwrap_err(), error);
    }

    #[test]
    fn dropped_completion_clears_entry_and_closes_waiters() {
        let table = Arc::new(PendingTable::default());
        let k = key("app-1");
        let (tx, mut rx) = oneshot::channel();
        table.register(&k, WaiterToken::new(), tx);

        drop(Completion::new(Arc::clone(&table), k));

        assert!(!table.is_pending("app-1"));
        assert!(matches!(rx.try_recv(), Err(oneshot::error::TryRecvError::Closed)));
    }

    #[test]
    fn finished_completion_broadcasts_once() {
        let table = Arc::new(PendingTable::default());
        let k = key("app-1");
        let (tx, mut rx) = oneshot::channel();
        table.register(&k, WaiterToken::new(), tx);

        let completion = Completion::new(Arc::clone(&table), k);
        assert_eq!(completion.finish(Err(RetrieveError::Decode("bad".to_string()))), 1);
        assert!(rx.try_recv().unwrap().is_err());
        assert!(table.keys().is_empty());
    }
}
