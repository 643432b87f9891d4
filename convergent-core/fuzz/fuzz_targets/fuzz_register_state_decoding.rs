#![no_main]

use convergent_core::crdt::codec::decode_register;
use convergent_core::crdt::{LwwRegister, PeerId, WireFormat};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for format in [WireFormat::Json, WireFormat::Binary] {
        let Ok(state) = decode_register::<String>(data, format) else {
            continue;
        };

        // Anything past genesis replaces a fresh register outright
        let merged = LwwRegister::new(PeerId::new("fuzz"), String::new()).merge(&state);
        if state.timestamp > 0 {
            assert_eq!(merged.state(), &state);
        }
    }
});
