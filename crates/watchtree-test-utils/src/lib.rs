//! Test utilities and mock types for watchtree development.
//!
//! Provides mock implementations of the collaborator traits
//! ([`Solver`], [`ModelDescription`]), a seeded [`RandomWalkSolver`] for
//! long-running scenarios, and entity-hierarchy [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
mod walk;

pub use walk::RandomWalkSolver;

use std::collections::VecDeque;

use watchtree_core::{ModelDescription, ResultSet, Solver, SolverError, StateId};

/// Scripted [`Solver`].
///
/// Returns queued results in order. Once the queue is exhausted every
/// call returns an empty [`ResultSet`].
#[derive(Default)]
pub struct MockSolver {
    queue: VecDeque<Result<ResultSet, SolverError>>,
    calls: usize,
}

impl MockSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful step.
    pub fn with_ok(mut self, results: ResultSet) -> Self {
        self.queue.push_back(Ok(results));
        self
    }

    /// Queue a failing step.
    pub fn with_err(mut self, error: SolverError) -> Self {
        self.queue.push_back(Err(error));
        self
    }

    pub fn push(&mut self, step: Result<ResultSet, SolverError>) {
        self.queue.push_back(step);
    }

    /// Number of `advance` calls so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl Solver for MockSolver {
    fn advance(&mut self) -> Result<ResultSet, SolverError> {
        self.calls += 1;
        self.queue.pop_front().unwrap_or_else(|| Ok(ResultSet::new()))
    }
}

/// Fixed [`ModelDescription`].
#[derive(Clone, Debug, Default)]
pub struct MockModel {
    states: Vec<(StateId, Option<String>)>,
}

impl MockModel {
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateId>,
    {
        Self {
            states: states.into_iter().map(|s| (s.into(), None)).collect(),
        }
    }

    /// Declare a dimension vector for `state`, adding it if absent.
    pub fn with_dimension(mut self, state: &str, dimension: &str) -> Self {
        let state = StateId::from(state);
        match self.states.iter_mut().find(|(s, _)| *s == state) {
            Some((_, d)) => *d = Some(dimension.to_string()),
            None => self.states.push((state, Some(dimension.to_string()))),
        }
        self
    }
}

impl ModelDescription for MockModel {
    fn recorded_states(&self) -> Vec<StateId> {
        self.states.iter().map(|(s, _)| s.clone()).collect()
    }

    fn dimension(&self, state: &StateId) -> Option<String> {
        self.states
            .iter()
            .find(|(s, _)| s == state)
            .and_then(|(_, d)| d.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchtree_core::ResultAccess;

    #[test]
    fn mock_solver_replays_queue() {
        let first: ResultSet = [("v", 1.0)].into_iter().collect();
        let mut solver = MockSolver::new()
            .with_ok(first)
            .with_err(SolverError::ExecutionFailed {
                reason: "boom".into(),
            });
        assert_eq!(solver.remaining(), 2);
        let out = solver.advance().unwrap();
        assert_eq!(out.last_value(&StateId::from("v")), Some(1.0));
        assert!(solver.advance().is_err());
        assert!(solver.advance().unwrap().is_empty());
        assert_eq!(solver.calls(), 3);
    }

    #[test]
    fn mock_model_dimensions() {
        let model = MockModel::new(["v", "m/q"]).with_dimension("v", "0,0,-3,0,0,0,0");
        assert_eq!(model.recorded_states().len(), 2);
        assert_eq!(
            model.dimension(&StateId::from("v")).as_deref(),
            Some("0,0,-3,0,0,0,0")
        );
        assert_eq!(model.dimension(&StateId::from("m/q")), None);
    }
}
