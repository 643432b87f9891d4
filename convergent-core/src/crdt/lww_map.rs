/*
    lww_map.rs - Last-Write-Wins Map CRDT

    A string-keyed map built from one LwwRegister<Option<T>> per key.
    `None` is a tombstone: deleted keys stay in the map so their
    (writer, timestamp) survives future merges and a stale remote `set`
    cannot resurrect them.

    The map only talks to registers through their public set/merge
    operations, so values can themselves be nested CRDT states.
*/

use super::clock::PeerId;
use super::lww_register::{LwwRegister, RegisterState};
use super::traits::Crdt;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::debug;

/// Wire form of a map: every key's register state, tombstones included
pub type MapState<T> = BTreeMap<String, RegisterState<Option<T>>>;

/// Last-Write-Wins Map CRDT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LwwMap<T> {
    /// Identity used for local writes
    peer_id: PeerId,

    /// One register per key ever seen; `None` values are tombstones
    entries: BTreeMap<String, LwwRegister<Option<T>>>,
}

impl<T: Clone> LwwMap<T> {
    /// Create an empty map owned by `peer_id`
    pub fn new(peer_id: PeerId) -> Self {
        LwwMap {
            peer_id,
            entries: BTreeMap::new(),
        }
    }

    /// Resume a map from a loaded or received state
    pub fn from_state(peer_id: PeerId, state: MapState<T>) -> Self {
        let entries = state
            .into_iter()
            .map(|(key, reg_state)| (key, LwwRegister::from_state(peer_id.clone(), reg_state)))
            .collect();

        LwwMap { peer_id, entries }
    }

    /// Live entries with tombstones hidden
    pub fn value(&self) -> BTreeMap<String, T> {
        self.entries
            .iter()
            .filter_map(|(key, reg)| reg.get().as_ref().map(|v| (key.clone(), v.clone())))
            .collect()
    }

    /// True iff the key exists and is not tombstoned
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Get a live value by key
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|reg| reg.get().as_ref())
    }

    /// Write a value under `key`.
    ///
    /// Unknown keys get a fresh register seeded at timestamp 1 and owned by
    /// this peer.
    pub fn set(&self, key: impl Into<String>, value: T) -> Self {
        let key = key.into();
        let register = match self.entries.get(&key) {
            Some(existing) => existing.set(Some(value)),
            None => LwwRegister::from_state(
                self.peer_id.clone(),
                RegisterState::new(self.peer_id.clone(), 1, Some(value)),
            ),
        };

        let mut entries = self.entries.clone();
        entries.insert(key, register);
        LwwMap {
            peer_id: self.peer_id.clone(),
            entries,
        }
    }

    /// Tombstone `key`.
    ///
    /// A delete is an ordinary write of `None`. Keys never seen are left
    /// alone: no tombstone is created for them.
    pub fn delete(&self, key: &str) -> Self {
        let Some(existing) = self.entries.get(key) else {
            return self.clone();
        };

        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), existing.set(None));
        LwwMap {
            peer_id: self.peer_id.clone(),
            entries,
        }
    }

    /// Absorb a remote state.
    ///
    /// Only keys present in `remote` are touched. Known keys delegate to their
    /// register; unknown keys adopt the remote register state as-is.
    pub fn merge(&self, remote: &MapState<T>) -> Self {
        let mut entries = self.entries.clone();
        let mut adopted = 0usize;

        for (key, remote_state) in remote {
            match entries.get_mut(key) {
                Some(local) => {
                    *local = local.merge(remote_state);
                }
                None => {
                    entries.insert(
                        key.clone(),
                        LwwRegister::from_state(self.peer_id.clone(), remote_state.clone()),
                    );
                    adopted += 1;
                }
            }
        }

        debug!(
            peer = %self.peer_id,
            remote_keys = remote.len(),
            adopted,
            "lww map merged remote state"
        );

        LwwMap {
            peer_id: self.peer_id.clone(),
            entries,
        }
    }

    /// Merge another map into a new one
    pub fn merged(&self, other: &LwwMap<T>) -> Self {
        self.merge(&other.state())
    }

    /// Full state including tombstones, for serialization
    pub fn state(&self) -> MapState<T> {
        self.entries
            .iter()
            .map(|(key, reg)| (key.clone(), reg.state().clone()))
            .collect()
    }

    /// Register backing `key`, tombstoned or not
    pub fn register(&self, key: &str) -> Option<&LwwRegister<Option<T>>> {
        self.entries.get(key)
    }
}

impl<T> LwwMap<T> {
    /// Identity used for local writes
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Live keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, reg)| reg.get().is_some())
            .map(|(key, _)| key.as_str())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a key is deleted but retained for sync
    pub fn is_tombstoned(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|reg| reg.get().is_none())
    }

    pub fn tombstone_count(&self) -> usize {
        self.entries.values().filter(|reg| reg.get().is_none()).count()
    }
}

impl<T: Clone + PartialEq + Debug> Crdt for LwwMap<T> {
    type State = MapState<T>;
    type Value = BTreeMap<String, T>;

    fn from_state(peer_id: PeerId, state: Self::State) -> Self {
        LwwMap::from_state(peer_id, state)
    }

    fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    fn state(&self) -> Self::State {
        LwwMap::state(self)
    }

    fn merge(&self, remote: &Self::State) -> Self {
        LwwMap::merge(self, remote)
    }

    fn value(&self) -> Self::Value {
        LwwMap::value(self)
    }
}
