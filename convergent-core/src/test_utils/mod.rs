//! Test utilities and helpers for convergent
//!
//! Deterministic random state generators and assertions shared by unit
//! tests, integration tests, benches, the fuzz target and the CLI `check`
//! command.

pub mod assertions;
pub mod deterministic_rng;
pub mod fuzz;
pub mod generators;

pub use assertions::*;
pub use deterministic_rng::*;
pub use fuzz::*;
pub use generators::*;
