/*
    convergent-core - State-based convergent replicated data types

    Last-write-wins register and map CRDTs, the law checker that proves
    their merge functions converge, and the wire codec that guards them.
*/

pub mod config;
pub mod crdt;
pub mod logging;
pub mod metrics;
pub mod test_utils;

pub use crdt::{Crdt, LwwMap, LwwRegister, MapState, PeerId, RegisterState};
pub use logging::{init_logging, LogLevel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let map: LwwMap<i32> = LwwMap::new(PeerId::new("A"));
        assert!(map.value().is_empty());
        let _ = LogLevel::Info;
    }
}
