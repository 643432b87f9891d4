/*
    convergence.rs - Algebraic law checker for merge functions

    Verifies the three properties that make a state-based CRDT converge:
    - Commutativity: merge(a, b) == merge(b, a)
    - Associativity: merge(merge(a, b), c) == merge(a, merge(b, c))
    - Idempotence:   merge(a, a) == a

    A failing check means the merge function under test is wrong. It is a
    test oracle, not a runtime guard.
*/

use super::traits::{merge_states, Crdt};
use std::fmt::Debug;
use std::marker::PhantomData;
use thiserror::Error;

/// Which law a set of states broke
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvergenceViolation {
    #[error("merge is not commutative: merge(a, b) = {left}, merge(b, a) = {right}")]
    Commutativity { left: String, right: String },

    #[error("merge is not associative: merge(merge(a, b), c) = {left}, merge(a, merge(b, c)) = {right}")]
    Associativity { left: String, right: String },

    #[error("merge is not idempotent: merge(a, a) = {merged}, a = {original}")]
    Idempotence { merged: String, original: String },
}

/// Checks merge laws for any `merge` function and equality predicate
pub struct ConvergenceChecker<S, M, E> {
    merge: M,
    eq: E,
    _state: PhantomData<fn(&S) -> S>,
}

impl<S, M, E> ConvergenceChecker<S, M, E>
where
    M: Fn(&S, &S) -> S,
    E: Fn(&S, &S) -> bool,
{
    pub fn new(merge: M, eq: E) -> Self {
        ConvergenceChecker {
            merge,
            eq,
            _state: PhantomData,
        }
    }

    pub fn check_commutativity(&self, a: &S, b: &S) -> bool {
        (self.eq)(&(self.merge)(a, b), &(self.merge)(b, a))
    }

    pub fn check_associativity(&self, a: &S, b: &S, c: &S) -> bool {
        let left = (self.merge)(&(self.merge)(a, b), c);
        let right = (self.merge)(a, &(self.merge)(b, c));
        (self.eq)(&left, &right)
    }

    pub fn check_idempotence(&self, a: &S) -> bool {
        (self.eq)(&(self.merge)(a, a), a)
    }
}

impl<S, M, E> ConvergenceChecker<S, M, E>
where
    S: Debug,
    M: Fn(&S, &S) -> S,
    E: Fn(&S, &S) -> bool,
{
    /// Run every law over the triple and report the first one that fails.
    ///
    /// Idempotence is checked for each state, commutativity for each pair.
    pub fn verify(&self, a: &S, b: &S, c: &S) -> Result<(), ConvergenceViolation> {
        for s in [a, b, c] {
            let merged = (self.merge)(s, s);
            if !(self.eq)(&merged, s) {
                return Err(ConvergenceViolation::Idempotence {
                    merged: format!("{:?}", merged),
                    original: format!("{:?}", s),
                });
            }
        }

        for (x, y) in [(a, b), (b, c), (a, c)] {
            let left = (self.merge)(x, y);
            let right = (self.merge)(y, x);
            if !(self.eq)(&left, &right) {
                return Err(ConvergenceViolation::Commutativity {
                    left: format!("{:?}", left),
                    right: format!("{:?}", right),
                });
            }
        }

        let left = (self.merge)(&(self.merge)(a, b), c);
        let right = (self.merge)(a, &(self.merge)(b, c));
        if !(self.eq)(&left, &right) {
            return Err(ConvergenceViolation::Associativity {
                left: format!("{:?}", left),
                right: format!("{:?}", right),
            });
        }

        Ok(())
    }
}

/// Checker over a CRDT's wire states, using its own merge and structural equality
pub fn checker_for<C: Crdt>(
) -> ConvergenceChecker<C::State, fn(&C::State, &C::State) -> C::State, fn(&C::State, &C::State) -> bool>
{
    let merge: fn(&C::State, &C::State) -> C::State = merge_states::<C>;
    let eq: fn(&C::State, &C::State) -> bool = |a, b| a == b;
    ConvergenceChecker::new(merge, eq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::{LwwRegister, PeerId, RegisterState};

    fn max_merge(a: &u32, b: &u32) -> u32 {
        *a.max(b)
    }

    #[test]
    fn test_max_is_a_valid_merge() {
        let checker = ConvergenceChecker::new(max_merge, |a: &u32, b: &u32| a == b);

        assert!(checker.check_commutativity(&1, &2));
        assert!(checker.check_associativity(&3, &1, &2));
        assert!(checker.check_idempotence(&5));
        assert!(checker.verify(&1, &2, &3).is_ok());
    }

    #[test]
    fn test_detects_non_commutative_merge() {
        // "Remote always wins" is the classic broken merge
        let checker = ConvergenceChecker::new(|_: &u32, b: &u32| *b, |a: &u32, b: &u32| a == b);

        assert!(!checker.check_commutativity(&1, &2));
        assert!(matches!(
            checker.verify(&1, &2, &3),
            Err(ConvergenceViolation::Commutativity { .. })
        ));
    }

    #[test]
    fn test_detects_non_idempotent_merge() {
        let checker = ConvergenceChecker::new(|a: &u32, b: &u32| a + b, |a: &u32, b: &u32| a == b);

        assert!(!checker.check_idempotence(&1));
        assert!(checker.check_idempotence(&0));
        assert!(matches!(
            checker.verify(&1, &2, &3),
            Err(ConvergenceViolation::Idempotence { .. })
        ));
    }

    #[test]
    fn test_detects_non_associative_merge() {
        // Averaging is commutative and idempotent but not associative
        let checker = ConvergenceChecker::new(
            |a: &f64, b: &f64| (a + b) / 2.0,
            |a: &f64, b: &f64| (a - b).abs() < f64::EPSILON,
        );

        assert!(checker.check_commutativity(&1.0, &4.0));
        assert!(checker.check_idempotence(&2.0));
        assert!(!checker.check_associativity(&0.0, &0.0, &8.0));
        assert!(matches!(
            checker.verify(&0.0, &0.0, &8.0),
            Err(ConvergenceViolation::Associativity { .. })
        ));
    }

    #[test]
    fn test_checker_for_register() {
        let checker = checker_for::<LwwRegister<String>>();
        let a = RegisterState::new(PeerId::new("A"), 1, "x".to_string());
        let b = RegisterState::new(PeerId::new("B"), 1, "y".to_string());
        let c = RegisterState::new(PeerId::new("C"), 0, "z".to_string());

        assert!(checker.check_commutativity(&a, &b));
        assert!(checker.check_associativity(&a, &b, &c));
        assert!(checker.check_idempotence(&a));
        assert_eq!(checker.verify(&a, &b, &c), Ok(()));
    }

    #[test]
    fn test_violation_message_names_the_law() {
        let err = ConvergenceViolation::Idempotence {
            merged: "2".to_string(),
            original: "1".to_string(),
        };

        assert_eq!(err.to_string(), "merge is not idempotent: merge(a, a) = 2, a = 1");
    }
}
