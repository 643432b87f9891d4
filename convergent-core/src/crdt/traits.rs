/*
    traits.rs - Core CRDT trait definitions

    Defines the single capability every convergent type implements:
    - Expose a mergeable wire state
    - Merge a remote state into a new local instance
    - Derive the application-facing value
*/

use super::clock::PeerId;
use std::fmt::Debug;

/// Core trait that all state-based CRDTs implement.
///
/// Every operation is copy-on-write: it takes `&self` and returns a new
/// instance, leaving earlier snapshots untouched.
///
/// `merge` must be commutative, associative and idempotent over `State`.
pub trait Crdt: Clone {
    /// Wire form exchanged between peers
    type State: Clone + PartialEq + Debug;

    /// Application view of the current state
    type Value;

    /// Rebuild a replica owned by `peer_id` from a loaded or received state
    fn from_state(peer_id: PeerId, state: Self::State) -> Self;

    /// Identity used for local writes
    fn peer_id(&self) -> &PeerId;

    /// Full serializable state, including any tombstones
    fn state(&self) -> Self::State;

    /// Absorb a remote state, returning the merged replica
    fn merge(&self, remote: &Self::State) -> Self;

    /// Current value as seen by the application
    fn value(&self) -> Self::Value;

    /// Merge another replica's full state into this one
    fn merged(&self, other: &Self) -> Self {
        self.merge(&other.state())
    }
}

/// Join two wire states under `C`'s merge function.
///
/// The owning peer of the scratch replica is irrelevant: merge never reads it.
pub fn merge_states<C: Crdt>(local: &C::State, remote: &C::State) -> C::State {
    C::from_state(PeerId::new(""), local.clone())
        .merge(remote)
        .state()
}
