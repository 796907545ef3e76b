//! Per-step refresh of already-materialized watched leaves.

use tracing::trace;
use watchtree_core::{NodeId, ResultAccess, Sample, StepId};
use watchtree_obs::PathMapping;
use watchtree_tree::{Tree, TreeError};

use crate::config::SyncConfig;

/// What an incremental pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Leaves that received a new sample.
    pub updated: Vec<NodeId>,
    /// Identifiers that could not be found: the state id when the results
    /// lacked it, or the instance path when the mapping did.
    pub missing: Vec<String>,
}

/// Appends the step's values to every watched leaf without changing the
/// tree's structure.
///
/// Traversal is depth-first in insertion order over the target subtrees of
/// every entity. The reserved time leaf is skipped.
#[derive(Clone, Copy, Debug)]
pub struct IncrementalUpdater<'a> {
    config: &'a SyncConfig,
    mapping: &'a PathMapping,
}

impl<'a> IncrementalUpdater<'a> {
    /// An updater reading reverse mappings from `mapping`.
    pub fn new(config: &'a SyncConfig, mapping: &'a PathMapping) -> Self {
        Self { config, mapping }
    }

    /// Refresh every watched leaf from `results`.
    ///
    /// Misses do not stop the traversal; they are collected in the outcome
    /// for the caller to report once.
    pub fn run(
        &self,
        tree: &mut Tree,
        step: StepId,
        results: &dyn ResultAccess,
    ) -> Result<UpdateOutcome, TreeError> {
        let mut outcome = UpdateOutcome::default();
        for subtree in tree.target_subtrees(&self.config.aspect_id, self.config.subtree) {
            for leaf in tree.leaves(subtree) {
                let node = tree.node(leaf)?;
                if !node.is_watched() || self.is_time_leaf(node.id(), node.parent(), subtree) {
                    continue;
                }

                let path = tree.instance_path(leaf)?;
                let Some(state) = self.mapping.state_of(&path) else {
                    outcome.missing.push(path.encode());
                    continue;
                };
                let Some(value) = results.last_value(state) else {
                    outcome.missing.push(state.to_string());
                    continue;
                };

                tree.record(leaf, Sample::new(step, value))?;
                tree.propagate_modified(leaf)?;
                trace!(%step, leaf = %path, value, "updated leaf");
                outcome.updated.push(leaf);
            }
        }
        Ok(outcome)
    }

    fn is_time_leaf(&self, id: &str, parent: Option<NodeId>, subtree: NodeId) -> bool {
        parent == Some(subtree) && self.config.time_variable.as_deref() == Some(id)
    }
}
