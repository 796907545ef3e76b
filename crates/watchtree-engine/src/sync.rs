//! The synchronization state machine.
//!
//! [`SyncContext`] decides, per step, between a full pass (resolve every
//! state, materialize the watched ones) and an incremental pass (refresh
//! existing leaves). Two independent triggers force a full pass:
//!
//! - there is no tree yet: nothing was built, the caller discarded the
//!   tree, or the target subtrees hold no variables;
//! - the observation set is dirty.
//!
//! ```text
//! NoTree      --full pass-------------------> TreeCurrent
//! TreeCurrent --observation set changes-----> TreeStale
//! TreeStale   --full pass, mark_clean once--> TreeCurrent
//! TreeCurrent --step------------------------> TreeCurrent (incremental)
//! ```

use std::time::Instant;

use tracing::{debug, warn};
use watchtree_core::{
    NodeId, PathError, ResultAccess, Sample, StateId, StepId, SyncError, Unit,
};
use watchtree_obs::{ObservationSet, PathMapping};
use watchtree_path::StatePath;
use watchtree_tree::{materialize, Node, Tree, TreeError};

use crate::config::{ConfigError, MissingStateReport, SyncConfig};
use crate::metrics::SyncMetrics;
use crate::resolver::{PathResolver, Resolution};
use crate::updater::IncrementalUpdater;

// ── SyncState ───────────────────────────────────────────────────

/// Where the context stands relative to the caller's tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// No full pass has run since construction or the last discard.
    NoTree,
    /// The tree reflects the current observation set.
    TreeCurrent,
    /// The observation set changed since the last full pass.
    TreeStale,
}

/// Which kind of pass a [`SyncContext::sync`] call ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassMode {
    /// Resolve and materialize.
    Full,
    /// Refresh existing watched leaves.
    Incremental,
    /// Watching is off; the tree was not touched.
    Skipped,
}

// ── SyncReport ──────────────────────────────────────────────────

/// Result of a successful [`SyncContext::sync`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncReport {
    /// The pass that ran.
    pub mode: PassMode,
    /// The step that was synchronized.
    pub step: StepId,
    /// Every node whose `modified` flag was set by this pass, depth-first.
    /// The flags are cleared on the tree.
    pub modified: Vec<NodeId>,
    /// Leaves created by a full pass.
    pub leaves_created: usize,
    /// Existing leaves that received a sample.
    pub leaves_updated: usize,
    /// Items dropped for structural reasons (invalid path, kind conflict).
    pub skipped: usize,
    /// States no candidate root owns. Full passes only.
    pub unowned: usize,
    /// Timing for this pass.
    pub metrics: SyncMetrics,
}

impl SyncReport {
    fn new(mode: PassMode, step: StepId) -> Self {
        Self {
            mode,
            step,
            modified: Vec::new(),
            leaves_created: 0,
            leaves_updated: 0,
            skipped: 0,
            unowned: 0,
            metrics: SyncMetrics::default(),
        }
    }
}

// ── SyncContext ─────────────────────────────────────────────────

/// Per-session synchronization driver.
///
/// Owns the observation set, the path mapping, and the elapsed-time
/// counter. The tree itself belongs to the caller and is passed to every
/// [`sync`](Self::sync) call; one context should always be used with the
/// same tree.
///
/// # Example
///
/// ```
/// use watchtree_core::{ResultSet, StepId};
/// use watchtree_engine::{PassMode, SyncConfig, SyncContext};
/// use watchtree_path::InstancePath;
/// use watchtree_tree::Tree;
///
/// let mut tree = Tree::new();
/// let net = tree.add_root_entity("net").unwrap();
/// tree.add_aspect(net, "electrical").unwrap();
///
/// let mut ctx = SyncContext::new(SyncConfig::default()).unwrap();
/// ctx.observation_mut().add(InstancePath::decode("net.electrical.v").unwrap());
/// ctx.observation_mut().start_watch();
///
/// let results: ResultSet = [("v", -65.0)].into_iter().collect();
/// let report = ctx.sync(&mut tree, StepId(1), &results).unwrap();
/// assert_eq!(report.mode, PassMode::Full);
/// assert_eq!(report.leaves_created, 1);
///
/// let results: ResultSet = [("v", -64.0)].into_iter().collect();
/// let report = ctx.sync(&mut tree, StepId(2), &results).unwrap();
/// assert_eq!(report.mode, PassMode::Incremental);
/// assert_eq!(report.leaves_updated, 1);
/// ```
#[derive(Clone, Debug)]
pub struct SyncContext {
    config: SyncConfig,
    observation: ObservationSet,
    mapping: PathMapping,
    built: bool,
    elapsed: f64,
    full_passes: u64,
    incremental_passes: u64,
    last_metrics: SyncMetrics,
}

impl SyncContext {
    /// Create a context with an empty observation set.
    pub fn new(config: SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            observation: ObservationSet::new(),
            mapping: PathMapping::new(),
            built: false,
            elapsed: 0.0,
            full_passes: 0,
            incremental_passes: 0,
            last_metrics: SyncMetrics::default(),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The watch list.
    pub fn observation(&self) -> &ObservationSet {
        &self.observation
    }

    /// Mutable watch list. Changing membership moves the context to
    /// [`SyncState::TreeStale`].
    pub fn observation_mut(&mut self) -> &mut ObservationSet {
        &mut self.observation
    }

    /// The state/instance path cache.
    pub fn mapping(&self) -> &PathMapping {
        &self.mapping
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        match (self.built, self.observation.is_dirty()) {
            (false, _) => SyncState::NoTree,
            (true, true) => SyncState::TreeStale,
            (true, false) => SyncState::TreeCurrent,
        }
    }

    /// Elapsed simulated time recorded on the time axis.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Metrics from the most recent pass.
    pub fn last_metrics(&self) -> &SyncMetrics {
        &self.last_metrics
    }

    /// Forget that a tree was built. The next sync runs a full pass.
    pub fn discard_tree(&mut self) {
        self.built = false;
    }

    /// Synchronize `tree` with one step of results.
    ///
    /// With watching off this does nothing and reports
    /// [`PassMode::Skipped`]. Otherwise it advances the time axis, then
    /// runs a full pass if a trigger is set and an incremental pass if
    /// not.
    ///
    /// # Errors
    ///
    /// [`SyncError::StateNotFound`] after an incremental pass in which
    /// some watched leaves could not be refreshed. Every other leaf was
    /// updated and its modified flags are still set on the tree.
    pub fn sync(
        &mut self,
        tree: &mut Tree,
        step: StepId,
        results: &dyn ResultAccess,
    ) -> Result<SyncReport, SyncError> {
        if !self.observation.is_watching() {
            return Ok(SyncReport::new(PassMode::Skipped, step));
        }

        let start = Instant::now();
        let mut metrics = SyncMetrics::default();

        let t0 = Instant::now();
        self.advance_time(tree, step);
        metrics.time_axis_us = t0.elapsed().as_micros() as u64;

        let full = !self.built || self.observation.is_dirty() || self.trees_emptied(tree);
        let outcome = if full {
            self.full_pass(tree, step, results, &mut metrics)
        } else {
            self.incremental_pass(tree, step, results, &mut metrics)
        };

        metrics.total_us = start.elapsed().as_micros() as u64;
        metrics.full_passes = self.full_passes;
        metrics.incremental_passes = self.incremental_passes;
        self.last_metrics = metrics.clone();

        let mut report = outcome?;
        report.modified = tree.take_modified();
        report.metrics = metrics;
        debug!(
            %step,
            mode = ?report.mode,
            created = report.leaves_created,
            updated = report.leaves_updated,
            skipped = report.skipped,
            total_us = report.metrics.total_us,
            "sync pass complete"
        );
        Ok(report)
    }

    // ── passes ──────────────────────────────────────────────────

    fn full_pass(
        &mut self,
        tree: &mut Tree,
        step: StepId,
        results: &dyn ResultAccess,
        metrics: &mut SyncMetrics,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new(PassMode::Full, step);
        let roots: Vec<NodeId> = tree.roots().collect();
        let states: Vec<StateId> = results.state_ids().cloned().collect();
        metrics.states_seen = states.len();

        for state in &states {
            let t0 = Instant::now();
            let resolved = Self::resolve(tree, &self.config, &roots, state);
            metrics.resolve_us += t0.elapsed().as_micros() as u64;

            let resolution = match resolved {
                Ok(Some(resolution)) => resolution,
                Ok(None) => {
                    report.unowned += 1;
                    debug!(%state, "no entity owns state");
                    continue;
                }
                Err(e) => {
                    report.skipped += 1;
                    warn!(%state, error = %e, "skipping state");
                    continue;
                }
            };
            if !self.observation.contains(&resolution.full) {
                continue;
            }

            let sample = results.last_value(state).map(|value| Sample::new(step, value));
            if sample.is_none() {
                debug!(%state, "state recorded no samples this step");
            }
            let unit = results.dimension(state).and_then(|dimension| {
                Unit::from_dimension(dimension)
                    .map_err(|e| warn!(%state, error = %e, "ignoring dimension"))
                    .ok()
            });

            let t0 = Instant::now();
            match materialize(tree, resolution.subtree, &resolution.suffix, sample, unit) {
                Ok(m) => {
                    if m.created {
                        report.leaves_created += 1;
                    } else if sample.is_some() {
                        report.leaves_updated += 1;
                    }
                    self.mapping.insert(state.clone(), resolution.full);
                }
                Err(e) => {
                    report.skipped += 1;
                    warn!(%state, error = %e, "skipping state");
                }
            }
            metrics.materialize_us += t0.elapsed().as_micros() as u64;
        }

        self.sync_watched_flags(tree)
            .map_err(|e| SyncError::BuildFailure {
                reason: e.to_string(),
            })?;
        self.observation.mark_clean();
        self.built = true;
        self.full_passes += 1;
        Ok(report)
    }

    fn incremental_pass(
        &mut self,
        tree: &mut Tree,
        step: StepId,
        results: &dyn ResultAccess,
        metrics: &mut SyncMetrics,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new(PassMode::Incremental, step);
        metrics.states_seen = results.state_ids().count();

        let t0 = Instant::now();
        let outcome = IncrementalUpdater::new(&self.config, &self.mapping)
            .run(tree, step, results)
            .map_err(|e| SyncError::BuildFailure {
                reason: e.to_string(),
            })?;
        metrics.update_us = t0.elapsed().as_micros() as u64;
        self.incremental_passes += 1;

        report.leaves_updated = outcome.updated.len();
        if outcome.missing.is_empty() {
            return Ok(report);
        }

        let total = outcome.missing.len();
        warn!(%step, total, "watched states missing from step results");
        let mut missing = outcome.missing;
        if self.config.missing_report == MissingStateReport::First {
            missing.truncate(1);
        }
        Err(SyncError::StateNotFound { missing, total })
    }

    // ── helpers ─────────────────────────────────────────────────

    /// Try each root in turn; the first root that resolves wins.
    ///
    /// `Ok(None)` means no root owns the state. A root that owns the state
    /// but rejects it does not stop the search; its error is returned only
    /// if no later root resolves.
    fn resolve(
        tree: &Tree,
        config: &SyncConfig,
        roots: &[NodeId],
        state: &StateId,
    ) -> Result<Option<Resolution>, PathError> {
        let path = StatePath::from_state(state)?;
        let resolver = PathResolver::new(tree, &config.aspect_id, config.subtree);
        let mut rejected = None;
        for &root in roots {
            match resolver.resolve(root, &path) {
                Ok(resolution) => return Ok(Some(resolution)),
                Err(PathError::PathNotOwned { .. }) => continue,
                Err(e) => {
                    rejected.get_or_insert(e);
                }
            }
        }
        rejected.map_or(Ok(None), Err)
    }

    /// Record elapsed time in the time leaf of every target subtree,
    /// creating the leaf where missing.
    fn advance_time(&mut self, tree: &mut Tree, step: StepId) {
        let Some(time) = self.config.time_variable.as_deref() else {
            return;
        };
        self.elapsed += self.config.timestep;
        let sample = Sample::new(step, self.elapsed);

        for subtree in tree.target_subtrees(&self.config.aspect_id, self.config.subtree) {
            let leaf = match tree.child(subtree, time) {
                Some(leaf) => leaf,
                None => {
                    let unit = Some(Unit::new(self.config.time_unit.as_str()));
                    match tree.add_leaf(subtree, time, unit) {
                        Ok(leaf) => leaf,
                        Err(e) => {
                            warn!(error = %e, "cannot create time leaf");
                            continue;
                        }
                    }
                }
            };
            let recorded = tree
                .record(leaf, sample)
                .and_then(|_| tree.propagate_modified(leaf));
            if let Err(e) = recorded {
                warn!(error = %e, "cannot record elapsed time");
            }
        }
    }

    /// Whether every target subtree is empty apart from the time leaf.
    fn trees_emptied(&self, tree: &Tree) -> bool {
        let time = self.config.time_variable.as_deref();
        tree.target_subtrees(&self.config.aspect_id, self.config.subtree)
            .into_iter()
            .filter_map(|subtree| tree.get(subtree).and_then(Node::children))
            .all(|children| children.keys().all(|k| Some(k.as_str()) == time))
    }

    /// Align every leaf's watched flag with the observation set, so that
    /// unwatched paths stop receiving samples.
    fn sync_watched_flags(&self, tree: &mut Tree) -> Result<(), TreeError> {
        let time = self.config.time_variable.as_deref();
        for subtree in tree.target_subtrees(&self.config.aspect_id, self.config.subtree) {
            for leaf in tree.leaves(subtree) {
                let node = tree.node(leaf)?;
                if node.parent() == Some(subtree) && Some(node.id()) == time {
                    continue;
                }
                let watched = self.observation.contains(&tree.instance_path(leaf)?);
                tree.set_watched(leaf, watched)?;
            }
        }
        Ok(())
    }
}
