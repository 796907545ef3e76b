//! Lockstep driver pairing a solver with a synchronized tree.
//!
//! [`Session`] owns the [`Solver`], the [`Tree`], and a [`SyncContext`].
//! Each [`step()`](Session::step) advances the solver once and folds the
//! results into the tree before returning, so the tree always reflects
//! the last completed step.

use tracing::warn;
use watchtree_core::{ModelDescription, PathError, Solver, StepId, SyncError};
use watchtree_obs::{ObservationSet, WatchableVariables};
use watchtree_path::InstancePath;
use watchtree_tree::Tree;

use crate::config::{ConfigError, SyncConfig};
use crate::metrics::SyncMetrics;
use crate::sync::{SyncContext, SyncReport, SyncState};

/// Single-threaded session advancing a solver in lockstep with its tree.
///
/// # Example
///
/// ```ignore
/// let mut session = Session::new(SyncConfig::default(), solver, tree)?;
/// session.watch("net.pop[0].electrical.v")?;
/// session.start_watch();
/// for _ in 0..1000 {
///     let report = session.step()?;
///     redraw(session.tree(), &report.modified);
/// }
/// ```
pub struct Session<S: Solver> {
    solver: S,
    tree: Tree,
    sync: SyncContext,
    step: StepId,
    watchable: Option<WatchableVariables>,
}

impl<S: Solver> Session<S> {
    /// Create a session over a caller-built entity hierarchy.
    pub fn new(config: SyncConfig, solver: S, tree: Tree) -> Result<Self, ConfigError> {
        Ok(Self {
            solver,
            tree,
            sync: SyncContext::new(config)?,
            step: StepId::default(),
            watchable: None,
        })
    }

    /// Like [`new`](Self::new), also cataloguing the model's recorded
    /// states as [`WatchableVariables`].
    pub fn from_model(
        config: SyncConfig,
        solver: S,
        tree: Tree,
        model: &dyn ModelDescription,
    ) -> Result<Self, ConfigError> {
        let mut session = Self::new(config, solver, tree)?;
        session.watchable = Some(WatchableVariables::from_states(model.recorded_states()));
        Ok(session)
    }

    /// Advance the solver one step and synchronize the tree.
    ///
    /// # Errors
    ///
    /// - [`SyncError::BuildFailure`] if the solver fails. The tree and the
    ///   step counter are untouched.
    /// - [`SyncError::StateNotFound`] if some watched leaves could not be
    ///   refreshed. The step still counts and every other leaf updated.
    pub fn step(&mut self) -> Result<SyncReport, SyncError> {
        let results = self.solver.advance().map_err(|e| {
            warn!(step = %self.step, error = %e, "solver failed");
            SyncError::from(e)
        })?;
        self.step = self.step.next();
        self.sync.sync(&mut self.tree, self.step, &results)
    }

    /// Add an instance path to the watch list.
    ///
    /// Returns `true` if the path was not already watched.
    pub fn watch(&mut self, path: &str) -> Result<bool, PathError> {
        let path = InstancePath::decode(path)?;
        Ok(self.sync.observation_mut().add(path))
    }

    /// Remove an instance path from the watch list.
    ///
    /// Returns `true` if the path was watched.
    pub fn unwatch(&mut self, path: &str) -> Result<bool, PathError> {
        let path = InstancePath::decode(path)?;
        Ok(self.sync.observation_mut().remove(&path))
    }

    /// Turn synchronization on.
    pub fn start_watch(&mut self) {
        self.sync.observation_mut().start_watch();
    }

    /// Turn synchronization off. Steps still advance the solver.
    pub fn stop_watch(&mut self) {
        self.sync.observation_mut().stop_watch();
    }

    /// The watch list.
    pub fn observation(&self) -> &ObservationSet {
        self.sync.observation()
    }

    /// The synchronized tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable tree access, for hierarchy edits between steps.
    ///
    /// Structural edits below target subtrees are not tracked; call
    /// [`discard_tree`](Self::discard_tree) after them.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Force a full pass on the next step.
    pub fn discard_tree(&mut self) {
        self.sync.discard_tree();
    }

    /// Synchronization state.
    pub fn state(&self) -> SyncState {
        self.sync.state()
    }

    /// The last completed step. Zero before the first step.
    pub fn current_step(&self) -> StepId {
        self.step
    }

    /// Metrics from the most recent pass.
    pub fn last_metrics(&self) -> &SyncMetrics {
        self.sync.last_metrics()
    }

    /// The variable catalog, when built with [`from_model`](Self::from_model).
    pub fn watchable_variables(&self) -> Option<&WatchableVariables> {
        self.watchable.as_ref()
    }
}

impl<S: Solver> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current_step", &self.step)
            .field("state", &self.sync.state())
            .field("nodes", &self.tree.len())
            .field("watched", &self.sync.observation().len())
            .finish()
    }
}
