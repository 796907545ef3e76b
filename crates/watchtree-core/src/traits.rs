//! Collaborator traits: step results, the solver, and the model description.
//!
//! These decouple the synchronization engine from any concrete numerical
//! backend. The engine reads results through `&dyn ResultAccess` and never
//! holds on to them past the pass that consumed them.

use crate::error::SolverError;
use crate::id::StateId;
use crate::results::ResultSet;

/// Read-only access to the values one solver step produced.
pub trait ResultAccess {
    /// Identifiers present in this step's results, in solver order.
    fn state_ids(&self) -> Box<dyn Iterator<Item = &StateId> + '_>;

    /// The most recent value recorded for `state` in this step.
    ///
    /// Returns `None` if the state is absent or recorded no samples.
    fn last_value(&self, state: &StateId) -> Option<f64>;

    /// The dimension vector declared for `state`, if the solver knows it.
    ///
    /// The format is the comma-separated exponent list understood by
    /// [`Unit::from_dimension`](crate::units::Unit::from_dimension).
    fn dimension(&self, state: &StateId) -> Option<&str>;
}

/// The numerical engine that advances the simulation.
///
/// Each call to [`advance`](Solver::advance) integrates one timestep and
/// returns every recorded state's samples produced since the last call.
pub trait Solver {
    /// Advance one step.
    ///
    /// On error no results are produced for this step; the caller must
    /// not mutate any tree.
    fn advance(&mut self) -> Result<ResultSet, SolverError>;
}

/// Static description of the simulated model, consulted at setup.
pub trait ModelDescription {
    /// All state identifiers the model declares as recording targets.
    fn recorded_states(&self) -> Vec<StateId>;

    /// Declared dimension vector of a state, if any.
    fn dimension(&self, state: &StateId) -> Option<String>;
}
