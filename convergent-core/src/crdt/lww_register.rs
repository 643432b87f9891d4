/*
    lww_register.rs - Last-Write-Wins Register CRDT

    A CRDT that holds a single value.
    Conflicts are resolved by keeping the state with the larger
    (timestamp, writer id) stamp; equal timestamps fall back to the writer id.

    Registers are immutable: `set` and `merge` return a new register and
    leave the receiver untouched.
*/

use super::clock::{tick, LogicalTimestamp, PeerId, Stamp};
use super::traits::Crdt;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::trace;

/// Wire form of a register: who wrote it, when, and what
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterState<T> {
    /// Peer that produced this state
    pub writer_id: PeerId,

    /// Writer's logical timestamp at the time of the write
    pub timestamp: LogicalTimestamp,

    /// Stored value
    pub value: T,
}

impl<T> RegisterState<T> {
    pub fn new(writer_id: PeerId, timestamp: LogicalTimestamp, value: T) -> Self {
        RegisterState { writer_id, timestamp, value }
    }

    /// The `(timestamp, writer id)` pair used for conflict resolution
    pub fn stamp(&self) -> Stamp<'_> {
        Stamp::new(self.timestamp, &self.writer_id)
    }

    /// Transform the value, keeping the writer metadata
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> RegisterState<U> {
        RegisterState {
            writer_id: self.writer_id,
            timestamp: self.timestamp,
            value: f(self.value),
        }
    }
}

/// Last-Write-Wins Register CRDT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LwwRegister<T> {
    /// Identity used for local writes
    peer_id: PeerId,

    /// Current winning state
    state: RegisterState<T>,
}

impl<T: Clone> LwwRegister<T> {
    /// Create a register holding `initial` at timestamp 0, written by `peer_id`
    pub fn new(peer_id: PeerId, initial: T) -> Self {
        let state = RegisterState::new(peer_id.clone(), 0, initial);
        LwwRegister { peer_id, state }
    }

    /// Resume a register from an existing state.
    ///
    /// The state keeps its own writer; `peer_id` is only used for later writes.
    pub fn from_state(peer_id: PeerId, state: RegisterState<T>) -> Self {
        LwwRegister { peer_id, state }
    }

    /// Get the current value
    pub fn value(&self) -> T {
        self.state.value.clone()
    }

    /// Write a new value stamped one past the current timestamp.
    ///
    /// The increment is taken from the state in hand, whoever wrote it.
    pub fn set(&self, value: T) -> Self {
        let timestamp = tick(self.state.timestamp);
        trace!(peer = %self.peer_id, timestamp, "lww register local write");

        LwwRegister {
            peer_id: self.peer_id.clone(),
            state: RegisterState::new(self.peer_id.clone(), timestamp, value),
        }
    }

    /// Merge a remote state into a new register.
    ///
    /// Local wins when its stamp is newer or identical; otherwise the remote
    /// state is adopted verbatim, writer and timestamp included.
    pub fn merge(&self, remote: &RegisterState<T>) -> Self {
        if self.state.stamp() >= remote.stamp() {
            trace!(
                local_writer = %self.state.writer_id,
                local_timestamp = self.state.timestamp,
                remote_writer = %remote.writer_id,
                remote_timestamp = remote.timestamp,
                "lww register kept local state"
            );
            return self.clone();
        }

        trace!(
            remote_writer = %remote.writer_id,
            remote_timestamp = remote.timestamp,
            "lww register adopted remote state"
        );
        LwwRegister {
            peer_id: self.peer_id.clone(),
            state: remote.clone(),
        }
    }

    /// Merge another register into a new one
    pub fn merged(&self, other: &LwwRegister<T>) -> Self {
        self.merge(&other.state)
    }

    /// Current state, for serialization
    pub fn state(&self) -> &RegisterState<T> {
        &self.state
    }

    pub fn into_state(self) -> RegisterState<T> {
        self.state
    }
}

impl<T> LwwRegister<T> {
    /// Borrow the current value
    pub fn get(&self) -> &T {
        &self.state.value
    }

    /// Identity used for local writes
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Peer that wrote the current state
    pub fn writer_id(&self) -> &PeerId {
        &self.state.writer_id
    }

    /// Timestamp of the current state
    pub fn timestamp(&self) -> LogicalTimestamp {
        self.state.timestamp
    }

    pub fn stamp(&self) -> Stamp<'_> {
        self.state.stamp()
    }
}

impl<T: Clone + PartialEq + Debug> Crdt for LwwRegister<T> {
    type State = RegisterState<T>;
    type Value = T;

    fn from_state(peer_id: PeerId, state: Self::State) -> Self {
        LwwRegister::from_state(peer_id, state)
    }

    fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    fn state(&self) -> Self::State {
        self.state.clone()
    }

    fn merge(&self, remote: &Self::State) -> Self {
        LwwRegister::merge(self, remote)
    }

    fn value(&self) -> Self::Value {
        LwwRegister::value(self)
    }
}
