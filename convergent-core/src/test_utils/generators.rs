//! Random register and map state generators
//!
//! Generated states respect the peer id uniqueness precondition: the value
//! stored under a given `(key, writer, timestamp)` is a pure function of
//! that triple, exactly as if one real peer had produced it.

use super::deterministic_rng::case_seed;
use crate::crdt::{LogicalTimestamp, MapState, PeerId, RegisterState};
use rand::Rng;

/// Key used for standalone register states
const REGISTER_KEY: &str = "";

/// Size of the generated state space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateShape {
    /// Number of distinct writers
    pub peers: usize,

    /// Number of distinct map keys
    pub keys: usize,

    /// Largest timestamp drawn (inclusive)
    pub max_timestamp: LogicalTimestamp,
}

impl Default for StateShape {
    fn default() -> Self {
        // Small ranges make timestamp ties, and so tie-breaks, common
        StateShape {
            peers: 3,
            keys: 4,
            max_timestamp: 4,
        }
    }
}

/// Writer ids `peer-0`, `peer-1`, ...
pub fn peer_pool(peers: usize) -> Vec<PeerId> {
    (0..peers).map(|i| PeerId::new(format!("peer-{}", i))).collect()
}

/// Keys `key-0`, `key-1`, ...
pub fn key_pool(keys: usize) -> Vec<String> {
    (0..keys).map(|i| format!("key-{}", i)).collect()
}

// FNV-1a over `key 0xff writer`, mixed with the timestamp. Must not depend on
// the toolchain's hasher: seeds are replayed across builds.
fn fingerprint(key: &str, writer: &PeerId, timestamp: LogicalTimestamp) -> u64 {
    let bytes = key.bytes().chain([0xff]).chain(writer.as_str().bytes());
    let hash = bytes.fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    case_seed(hash, timestamp)
}

/// Value a register write carries, fixed by who wrote it and when
pub fn written_value(key: &str, writer: &PeerId, timestamp: LogicalTimestamp) -> u64 {
    fingerprint(key, writer, timestamp) % 1000
}

/// Whether the write under `(key, writer, timestamp)` was a delete
pub fn is_delete(key: &str, writer: &PeerId, timestamp: LogicalTimestamp) -> bool {
    fingerprint(key, writer, timestamp) % 4 == 0
}

fn pick_writer<R: Rng>(rng: &mut R, shape: &StateShape) -> (PeerId, LogicalTimestamp) {
    let peer = rng.random_range(0..shape.peers.max(1));
    let timestamp = rng.random_range(0..=shape.max_timestamp);
    (PeerId::new(format!("peer-{}", peer)), timestamp)
}

/// A register state some replica could have produced
pub fn random_register_state<R: Rng>(rng: &mut R, shape: &StateShape) -> RegisterState<u64> {
    let (writer, timestamp) = pick_writer(rng, shape);
    let value = written_value(REGISTER_KEY, &writer, timestamp);
    RegisterState::new(writer, timestamp, value)
}

/// A map state over a random subset of the key pool, tombstones included
pub fn random_map_state<R: Rng>(rng: &mut R, shape: &StateShape) -> MapState<u64> {
    let mut state = MapState::new();

    for key in key_pool(shape.keys) {
        if !rng.random_bool(0.6) {
            continue;
        }

        let (writer, timestamp) = pick_writer(rng, shape);
        let value = if is_delete(&key, &writer, timestamp) {
            None
        } else {
            Some(written_value(&key, &writer, timestamp))
        };
        state.insert(key, RegisterState::new(writer, timestamp, value));
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_rng;

    #[test]
    fn test_written_value_is_a_function_of_the_write() {
        let a = PeerId::new("peer-0");

        assert_eq!(written_value("k", &a, 3), written_value("k", &a, 3));
        assert_eq!(is_delete("k", &a, 3), is_delete("k", &a, 3));
    }

    #[test]
    fn test_written_values_are_pinned() {
        assert_eq!(written_value("k", &PeerId::new("peer-0"), 3), 47);
        assert_eq!(written_value("", &PeerId::new("peer-1"), 0), 450);
        assert_eq!(written_value("key-2", &PeerId::new("peer-2"), 4), 68);
        assert!(is_delete("key-2", &PeerId::new("peer-2"), 4));
        assert!(!is_delete("k", &PeerId::new("peer-0"), 3));
    }

    #[test]
    fn test_register_states_respect_shape() {
        let mut rng = test_rng();
        let shape = StateShape::default();
        let peers = peer_pool(shape.peers);

        for _ in 0..200 {
            let state = random_register_state(&mut rng, &shape);
            assert!(state.timestamp <= shape.max_timestamp);
            assert!(peers.contains(&state.writer_id));
        }
    }

    #[test]
    fn test_map_states_use_the_key_pool() {
        let mut rng = test_rng();
        let shape = StateShape::default();
        let keys = key_pool(shape.keys);

        let mut saw_tombstone = false;
        for _ in 0..200 {
            let state = random_map_state(&mut rng, &shape);
            assert!(state.keys().all(|k| keys.contains(k)));
            saw_tombstone |= state.values().any(|reg| reg.value.is_none());
        }
        assert!(saw_tombstone);
    }

    #[test]
    fn test_peer_pool_names() {
        let peers = peer_pool(2);
        assert_eq!(peers, vec![PeerId::new("peer-0"), PeerId::new("peer-1")]);
    }
}
