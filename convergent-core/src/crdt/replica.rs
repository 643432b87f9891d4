/*
    replica.rs - Shared handle to one replica's current snapshot

    CRDT values are immutable; a replica that several callers write to in
    the same process needs one place holding the latest snapshot. Every
    update reads the snapshot in hand and swaps in the result under the
    write lock, so concurrent `set` calls never lose a timestamp increment.
*/

use super::traits::Crdt;
use crate::metrics::{record_counter, Timer, LOCAL_WRITES, MERGES, MERGE_DURATION_MS};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

/// Errors raised by a shared replica
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplicaError {
    /// A writer panicked while holding the lock
    #[error("Replica lock poisoned")]
    Poisoned,
}

/// Result type for shared replica operations
pub type ReplicaResult<T> = Result<T, ReplicaError>;

/// Cloneable handle to a replica shared between callers
#[derive(Debug, Clone)]
pub struct SharedReplica<C> {
    inner: Arc<RwLock<C>>,
}

impl<C: Crdt> SharedReplica<C> {
    pub fn new(replica: C) -> Self {
        SharedReplica {
            inner: Arc::new(RwLock::new(replica)),
        }
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> ReplicaResult<C> {
        let guard = self.inner.read().map_err(|_| ReplicaError::Poisoned)?;
        Ok((*guard).clone())
    }

    /// Current wire state
    pub fn state(&self) -> ReplicaResult<C::State> {
        let guard = self.inner.read().map_err(|_| ReplicaError::Poisoned)?;
        Ok(guard.state())
    }

    /// Current application value
    pub fn value(&self) -> ReplicaResult<C::Value> {
        let guard = self.inner.read().map_err(|_| ReplicaError::Poisoned)?;
        Ok(guard.value())
    }

    /// Apply a local write, e.g. `|map| map.set("k", v)`.
    ///
    /// Returns the new snapshot.
    pub fn update<F>(&self, write: F) -> ReplicaResult<C>
    where
        F: FnOnce(&C) -> C,
    {
        let mut guard = self.inner.write().map_err(|_| ReplicaError::Poisoned)?;
        let next = write(&*guard);
        *guard = next.clone();
        drop(guard);

        record_counter(LOCAL_WRITES, 1);
        debug!(peer = %next.peer_id(), "replica applied local write");
        Ok(next)
    }

    /// Merge a remote state into the shared snapshot
    pub fn absorb(&self, remote: &C::State) -> ReplicaResult<C> {
        let mut guard = self.inner.write().map_err(|_| ReplicaError::Poisoned)?;
        let timer = Timer::new(MERGE_DURATION_MS);
        let next = guard.merge(remote);
        *guard = next.clone();
        drop(guard);
        timer.stop();

        record_counter(MERGES, 1);
        debug!(peer = %next.peer_id(), "replica absorbed remote state");
        Ok(next)
    }
}
