//! Deterministic solver producing bounded random walks.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use watchtree_core::{ResultSet, Solver, SolverError, StateId};

/// [`Solver`] whose states each take a seeded random walk.
///
/// Every `advance` moves each state by a uniform step in
/// `[-amplitude, amplitude)` and records `samples_per_step` intermediate
/// values. The same seed always yields the same sequence.
pub struct RandomWalkSolver {
    rng: ChaCha8Rng,
    states: Vec<(StateId, f64)>,
    amplitude: f64,
    samples_per_step: usize,
    fail_at: Option<u64>,
    steps: u64,
}

impl RandomWalkSolver {
    pub fn new(seed: u64, states: impl IntoIterator<Item = StateId>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            states: states.into_iter().map(|s| (s, 0.0)).collect(),
            amplitude: 1.0,
            samples_per_step: 1,
            fail_at: None,
            steps: 0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Record this many samples per state each step. At least one.
    pub fn with_samples_per_step(mut self, n: usize) -> Self {
        self.samples_per_step = n.max(1);
        self
    }

    /// Fail the `step`-th call to `advance` (1-based).
    pub fn failing_at(mut self, step: u64) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Current value of every state.
    pub fn values(&self) -> &[(StateId, f64)] {
        &self.states
    }

    fn unit(&mut self) -> f64 {
        // 53 random bits mapped onto [0, 1).
        (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Solver for RandomWalkSolver {
    fn advance(&mut self) -> Result<ResultSet, SolverError> {
        self.steps += 1;
        if self.fail_at == Some(self.steps) {
            return Err(SolverError::ExecutionFailed {
                reason: format!("scripted failure at step {}", self.steps),
            });
        }
        let mut out = ResultSet::new();
        for i in 0..self.states.len() {
            for _ in 0..self.samples_per_step {
                let delta = (self.unit() * 2.0 - 1.0) * self.amplitude;
                let (state, value) = &mut self.states[i];
                *value += delta;
                out.push(state.clone(), *value);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchtree_core::ResultAccess;

    fn states() -> Vec<StateId> {
        vec![StateId::from("a"), StateId::from("b")]
    }

    #[test]
    fn same_seed_same_walk() {
        let mut x = RandomWalkSolver::new(7, states());
        let mut y = RandomWalkSolver::new(7, states());
        for _ in 0..10 {
            assert_eq!(x.advance().unwrap(), y.advance().unwrap());
        }
    }

    #[test]
    fn steps_stay_within_amplitude() {
        let mut solver = RandomWalkSolver::new(1, states()).with_amplitude(0.5);
        let mut last = 0.0;
        for _ in 0..100 {
            let out = solver.advance().unwrap();
            let value = out.last_value(&StateId::from("a")).unwrap();
            assert!((value - last).abs() <= 0.5 + 1e-9);
            last = value;
        }
    }

    #[test]
    fn scripted_failure() {
        let mut solver = RandomWalkSolver::new(1, states()).failing_at(2);
        assert!(solver.advance().is_ok());
        assert!(solver.advance().is_err());
        assert!(solver.advance().is_ok());
    }

    #[test]
    fn records_every_sample() {
        let mut solver = RandomWalkSolver::new(3, states()).with_samples_per_step(4);
        let out = solver.advance().unwrap();
        let recording = out.get(&StateId::from("a")).unwrap();
        assert_eq!(recording.samples.len(), 4);
        assert_eq!(out.last_value(&StateId::from("a")), Some(solver.values()[0].1));
    }
}
