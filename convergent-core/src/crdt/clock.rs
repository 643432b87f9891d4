/*
    clock.rs - Logical clock and tie-break comparator

    Every merge decision in the engine reduces to comparing two
    (timestamp, peer id) pairs:
    - Larger timestamp wins
    - Equal timestamps fall back to the larger peer id

    The order must be identical on every replica or convergence breaks.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Per-peer logical counter. Not wall-clock time.
pub type LogicalTimestamp = u64;

/// Errors raised when building clock values from untrusted input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Peer id must not be empty")]
    EmptyPeerId,
}

/// Replica identity, ordered lexicographically by its bytes.
///
/// Two replicas sharing a peer id silently corrupt tie-breaking; uniqueness
/// is a precondition the embedding application must uphold.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap an identifier without validation
    pub fn new(id: impl Into<String>) -> Self {
        PeerId(id.into())
    }

    /// Wrap an identifier, rejecting the empty string
    pub fn parse(id: impl Into<String>) -> Result<Self, ClockError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ClockError::EmptyPeerId);
        }
        Ok(PeerId(id))
    }

    /// Generate a random identity
    pub fn generate() -> Self {
        PeerId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        PeerId::new(id)
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        PeerId(id)
    }
}

/// A borrowed `(timestamp, peer id)` pair.
///
/// Field order matters: the derived `Ord` compares `timestamp` first and only
/// consults `peer_id` on a tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp<'a> {
    pub timestamp: LogicalTimestamp,
    pub peer_id: &'a PeerId,
}

impl<'a> Stamp<'a> {
    pub fn new(timestamp: LogicalTimestamp, peer_id: &'a PeerId) -> Self {
        Stamp { timestamp, peer_id }
    }

    /// True when `self` strictly dominates `other`
    pub fn is_newer_than(&self, other: &Stamp<'_>) -> bool {
        self > other
    }
}

/// Next timestamp for a local write.
///
/// Saturates at `u64::MAX`; a replica would need 2^64 writes to reach it.
pub fn tick(current: LogicalTimestamp) -> LogicalTimestamp {
    current.saturating_add(1)
}
