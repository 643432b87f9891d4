/*
    CRDT subsystem - Convergent Replicated Data Types

    State-based last-write-wins types and the law checker that proves
    their merge functions converge.
*/

pub mod clock;
pub mod codec;
pub mod convergence;
pub mod lww_map;
pub mod lww_register;
pub mod replica;
pub mod traits;

#[cfg(test)]
mod tests;

pub use clock::{tick, ClockError, LogicalTimestamp, PeerId, Stamp};
pub use codec::{CodecError, CodecResult, WireFormat};
pub use convergence::{checker_for, ConvergenceChecker, ConvergenceViolation};
pub use lww_map::{LwwMap, MapState};
pub use lww_register::{LwwRegister, RegisterState};
pub use replica::{ReplicaError, ReplicaResult, SharedReplica};
pub use traits::{merge_states, Crdt};
