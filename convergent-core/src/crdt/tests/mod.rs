/*
    Cross-module CRDT tests

    Test suite covering:
    - Replica scenarios exchanged through the wire codec
    - Property-based merge laws for registers and maps
    - Map tombstone and key-adoption edge cases
*/

pub mod map_edge_cases;
