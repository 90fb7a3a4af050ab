//! Per-scope serialization.
//!
//! Every list mutation is a multi-step shift-then-set sequence that is not atomic against the
//! store. Each scope gets its own async mutex, held for the whole sequence; operations on
//! different scopes never contend.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive access to one scope, released on drop.
pub type ScopeGuard = OwnedMutexGuard<()>;

/// Lock table keyed by scope fingerprint.
#[derive(Debug, Default)]
pub(crate) struct ScopeLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScopeLocks {
    /// Waits for exclusive access to one scope.
    ///
    /// Entries nobody holds or waits on are pruned first.
    pub(crate) async fn acquire(&self, fingerprint: String) -> ScopeGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(fingerprint).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Acquires several scopes in fingerprint order, so two callers locking overlapping sets
    /// cannot deadlock. Duplicates are locked once.
    pub(crate) async fn acquire_all(&self, mut fingerprints: Vec<String>) -> Vec<ScopeGuard> {
        fingerprints.sort();
        fingerprints.dedup();
        let mut guards = Vec::with_capacity(fingerprints.len());
        for fingerprint in fingerprints {
            guards.push(self.acquire(fingerprint).await);
        }
        guards
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
