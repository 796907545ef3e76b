//! Bidirectional state-path/instance-path cache.

use indexmap::IndexMap;
use watchtree_core::StateId;
use watchtree_path::InstancePath;

/// Cache of resolved path pairs.
///
/// A pair is inserted the first time a state resolves to an instance path
/// that is in the observation set. Entries are never removed, so a state
/// whose owning entity is later replaced keeps its old mapping until the
/// caller builds a fresh context.
#[derive(Clone, Debug, Default)]
pub struct PathMapping {
    state_to_instance: IndexMap<StateId, InstancePath>,
    instance_to_state: IndexMap<InstancePath, StateId>,
}

impl PathMapping {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state <-> instance` unless `state` is already mapped.
    ///
    /// Returns `true` if the pair was inserted. An instance path already
    /// claimed by a different state is left alone, which keeps the
    /// mapping a bijection.
    pub fn insert(&mut self, state: StateId, instance: InstancePath) -> bool {
        if self.state_to_instance.contains_key(&state)
            || self.instance_to_state.contains_key(&instance)
        {
            return false;
        }
        self.instance_to_state.insert(instance.clone(), state.clone());
        self.state_to_instance.insert(state, instance);
        true
    }

    /// Forward lookup.
    pub fn instance_of(&self, state: &StateId) -> Option<&InstancePath> {
        self.state_to_instance.get(state)
    }

    /// Reverse lookup, used by incremental passes.
    pub fn state_of(&self, instance: &InstancePath) -> Option<&StateId> {
        self.instance_to_state.get(instance)
    }

    /// Number of mapped pairs.
    pub fn len(&self) -> usize {
        self.state_to_instance.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.state_to_instance.is_empty()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateId, &InstancePath)> {
        self.state_to_instance.iter()
    }
}
