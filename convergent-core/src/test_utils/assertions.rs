//! Assertions for replica convergence
//!
//! Panic with both diverging states printed, which plain `assert_eq!` on
//! a vector of replicas does not make readable.

use crate::crdt::Crdt;

/// Assert that every replica holds the same wire state
pub fn assert_converged<C: Crdt>(replicas: &[C]) {
    let Some(first) = replicas.first() else {
        return;
    };
    let expected = first.state();

    for (i, replica) in replicas.iter().enumerate().skip(1) {
        let actual = replica.state();
        if actual != expected {
            panic!(
                "Replica {} ({}) diverged from replica 0 ({}):\n  replica 0: {:?}\n  replica {}: {:?}",
                i,
                replica.peer_id(),
                first.peer_id(),
                expected,
                i,
                actual
            );
        }
    }
}

/// Fully exchange states between all replicas, every one absorbing every other
pub fn sync_all<C: Crdt>(replicas: &[C]) -> Vec<C> {
    let states: Vec<C::State> = replicas.iter().map(Crdt::state).collect();

    replicas
        .iter()
        .map(|replica| states.iter().fold(replica.clone(), |acc, s| acc.merge(s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::{LwwMap, PeerId};

    #[test]
    fn test_sync_all_converges() {
        let replicas = vec![
            LwwMap::new(PeerId::new("A")).set("x", 1),
            LwwMap::new(PeerId::new("B")).set("y", 2),
            LwwMap::new(PeerId::new("C")).set("x", 3),
        ];

        let synced = sync_all(&replicas);

        assert_converged(&synced);
        assert_eq!(synced[0].get("x"), Some(&3));
        assert_eq!(synced[0].get("y"), Some(&2));
    }

    #[test]
    #[should_panic(expected = "diverged from replica 0")]
    fn test_assert_converged_panics_on_divergence() {
        let replicas = vec![
            LwwMap::new(PeerId::new("A")).set("x", 1),
            LwwMap::new(PeerId::new("B")).set("x", 2),
        ];

        assert_converged(&replicas);
    }

    #[test]
    fn test_assert_converged_accepts_empty() {
        assert_converged::<LwwMap<i32>>(&[]);
    }
}
