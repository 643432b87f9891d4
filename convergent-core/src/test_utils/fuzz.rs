//! Seeded convergence fuzzing over generated register and map states

use super::deterministic_rng::{case_seed, test_rng_with_seed};
use super::generators::{random_map_state, random_register_state, StateShape};
use crate::crdt::{checker_for, ConvergenceViolation, LwwMap, LwwRegister};
use thiserror::Error;
use tracing::{debug, info};

/// A law violation together with what is needed to replay it
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} case {case} (seed {seed}) failed: {violation}")]
pub struct FuzzFailure {
    /// "register" or "map"
    pub kind: &'static str,
    pub case: u64,
    /// Per-case seed; `test_rng_with_seed(seed)` regenerates the triple
    pub seed: u64,
    pub violation: ConvergenceViolation,
}

/// Outcome of a passing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzReport {
    pub register_cases: u64,
    pub map_cases: u64,
}

/// Check every law on `cases` random register triples and as many map triples
pub fn run_convergence_fuzz(
    cases: u64,
    seed: u64,
    shape: &StateShape,
) -> Result<FuzzReport, FuzzFailure> {
    let registers = checker_for::<LwwRegister<u64>>();
    let maps = checker_for::<LwwMap<u64>>();

    for case in 0..cases {
        let replay_seed = case_seed(seed, case);
        let mut rng = test_rng_with_seed(replay_seed);

        let a = random_register_state(&mut rng, shape);
        let b = random_register_state(&mut rng, shape);
        let c = random_register_state(&mut rng, shape);
        registers
            .verify(&a, &b, &c)
            .map_err(|violation| FuzzFailure { kind: "register", case, seed: replay_seed, violation })?;

        let a = random_map_state(&mut rng, shape);
        let b = random_map_state(&mut rng, shape);
        let c = random_map_state(&mut rng, shape);
        maps.verify(&a, &b, &c)
            .map_err(|violation| FuzzFailure { kind: "map", case, seed: replay_seed, violation })?;

        debug!(case, seed = replay_seed, "convergence case passed");
    }

    info!(cases, seed, "convergence fuzz passed");
    Ok(FuzzReport {
        register_cases: cases,
        map_cases: cases,
    })
}
