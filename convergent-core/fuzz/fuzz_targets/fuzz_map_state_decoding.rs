#![no_main]

use convergent_core::crdt::codec::decode_map;
use convergent_core::crdt::{checker_for, LwwMap, MapState, WireFormat};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes are either rejected or decode to a state the merge
    // laws hold for
    let checker = checker_for::<LwwMap<u64>>();

    for format in [WireFormat::Json, WireFormat::Binary] {
        let Ok(state) = decode_map::<u64>(data, format) else {
            continue;
        };

        assert!(state.values().all(|reg| !reg.writer_id.is_empty()));
        assert!(checker.check_idempotence(&state));
        assert!(checker.check_commutativity(&state, &MapState::new()));
    }
});
