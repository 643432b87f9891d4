/*
    LWW map edge cases

    Tombstones arriving for keys never seen, re-setting deleted keys,
    registers stamped at timestamp 0, and merges that must be no-ops.
*/

use crate::crdt::{LwwMap, MapState, PeerId, RegisterState};

fn state_of(entries: &[(&str, &str, u64, Option<i32>)]) -> MapState<i32> {
    entries
        .iter()
        .map(|(key, writer, ts, value)| {
            (key.to_string(), RegisterState::new(PeerId::new(*writer), *ts, *value))
        })
        .collect()
}

#[test]
fn test_remote_tombstone_for_unknown_key_is_adopted() {
    let incoming = state_of(&[("gone", "B", 3, None)]);

    let a: LwwMap<i32> = LwwMap::new(PeerId::new("A")).merge(&incoming);

    assert!(!a.has("gone"));
    assert!(a.is_tombstoned("gone"));
    assert_eq!(a.tombstone_count(), 1);
    assert!(a.value().is_empty());
    // The tombstone is still part of what A ships onwards
    assert_eq!(a.state(), incoming);
}

#[test]
fn test_set_after_adopted_tombstone_outranks_it() {
    let incoming = state_of(&[("k", "B", 3, None)]);
    let a = LwwMap::new(PeerId::new("A")).merge(&incoming).set("k", 1);

    let reg = a.register("k").unwrap();
    assert_eq!(reg.timestamp(), 4);
    assert_eq!(reg.writer_id().as_str(), "A");
    assert_eq!(a.get("k"), Some(&1));
}

#[test]
fn test_delete_of_adopted_key() {
    let incoming = state_of(&[("k", "B", 2, Some(9))]);
    let a = LwwMap::new(PeerId::new("A")).merge(&incoming).delete("k");

    let reg = a.register("k").unwrap();
    assert_eq!(reg.timestamp(), 3);
    assert_eq!(reg.writer_id().as_str(), "A");
    assert!(!a.has("k"));
}

#[test]
fn test_delete_unknown_key_creates_no_tombstone() {
    let a: LwwMap<i32> = LwwMap::new(PeerId::new("A")).delete("missing");

    assert!(a.state().is_empty());
    assert_eq!(a.tombstone_count(), 0);
}

#[test]
fn test_delete_twice_advances_the_tombstone() {
    let a = LwwMap::new(PeerId::new("A")).set("k", 1).delete("k").delete("k");

    assert_eq!(a.register("k").unwrap().timestamp(), 3);
    assert!(a.is_tombstoned("k"));
}

#[test]
fn test_merge_with_empty_remote_is_noop() {
    let a = LwwMap::new(PeerId::new("A")).set("x", 1).delete("x").set("y", 2);

    assert_eq!(a.merge(&MapState::new()), a);
}

#[test]
fn test_merge_with_own_state_is_noop() {
    let a = LwwMap::new(PeerId::new("A")).set("x", 1).set("y", 2).delete("y");

    assert_eq!(a.merge(&a.state()), a);
}

#[test]
fn test_timestamp_zero_entries_order_by_peer() {
    let local = state_of(&[("k", "B", 0, Some(1))]);
    let remote = state_of(&[("k", "C", 0, Some(2))]);

    let a = LwwMap::from_state(PeerId::new("A"), local.clone());
    assert_eq!(a.merge(&remote).get("k"), Some(&2));

    let c = LwwMap::from_state(PeerId::new("C"), remote);
    assert_eq!(c.merge(&local).get("k"), Some(&2));
}

#[test]
fn test_set_on_timestamp_zero_entry_moves_to_one() {
    let a = LwwMap::from_state(PeerId::new("A"), state_of(&[("k", "Z", 0, Some(1))])).set("k", 5);

    let reg = a.register("k").unwrap();
    assert_eq!(reg.timestamp(), 1);
    assert_eq!(a.get("k"), Some(&5));
}

#[test]
fn test_only_remote_keys_are_touched() {
    let a = LwwMap::from_state(
        PeerId::new("A"),
        state_of(&[("mine", "A", 7, Some(1)), ("shared", "A", 1, Some(2))]),
    );

    let merged = a.merge(&state_of(&[("shared", "B", 5, Some(20))]));

    assert_eq!(merged.register("mine"), a.register("mine"));
    assert_eq!(merged.get("shared"), Some(&20));
}

#[test]
fn test_tombstone_wins_over_older_set_and_loses_to_newer() {
    let deleted = LwwMap::from_state(PeerId::new("A"), state_of(&[("k", "A", 4, None)]));

    let older = deleted.merge(&state_of(&[("k", "B", 3, Some(1))]));
    assert!(!older.has("k"));

    let tie_lower_peer = deleted.merge(&state_of(&[("k", "0", 4, Some(1))]));
    assert!(!tie_lower_peer.has("k"));

    let newer = deleted.merge(&state_of(&[("k", "B", 5, Some(1))]));
    assert_eq!(newer.get("k"), Some(&1));
    assert!(!newer.is_tombstoned("k"));
}

#[test]
fn test_keys_and_len_skip_tombstones() {
    let a = LwwMap::new(PeerId::new("A")).set("a", 1).set("b", 2).set("c", 3).delete("b");

    assert_eq!(a.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    assert_eq!(a.len(), 2);
    assert!(!a.is_empty());
    assert_eq!(a.state().len(), 3);
}

#[test]
fn test_value_snapshot_is_independent() {
    let a = LwwMap::new(PeerId::new("A")).set("x", 1);
    let mut snapshot = a.value();
    snapshot.insert("x".to_string(), 100);

    assert_eq!(a.get("x"), Some(&1));
}
