//! Concrete per-step result mapping.

use indexmap::IndexMap;

use crate::id::StateId;
use crate::traits::ResultAccess;

/// Samples recorded for one state during a single solver step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recording {
    /// Values produced since the previous step, oldest first.
    pub samples: Vec<f64>,
    /// Declared dimension vector (see [`crate::units`]).
    pub dimension: Option<String>,
}

impl Recording {
    /// A recording holding a single value and no dimension.
    pub fn single(value: f64) -> Self {
        Self {
            samples: vec![value],
            dimension: None,
        }
    }

    /// The newest sample, if any.
    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }
}

/// Mapping from state identifier to the samples one step produced.
///
/// Iteration order is insertion order, which is the solver's own order.
/// The synchronization engine relies on that for deterministic node
/// creation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    states: IndexMap<StateId, Recording>,
}

impl ResultSet {
    /// An empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the recording for `state`, creating it if needed.
    pub fn push(&mut self, state: impl Into<StateId>, value: f64) {
        self.states
            .entry(state.into())
            .or_default()
            .samples
            .push(value);
    }

    /// Replace the recording for `state`.
    pub fn insert(&mut self, state: impl Into<StateId>, recording: Recording) {
        self.states.insert(state.into(), recording);
    }

    /// Set the declared dimension of `state`, creating an empty recording
    /// if the state has not been seen yet.
    pub fn set_dimension(&mut self, state: impl Into<StateId>, dimension: impl Into<String>) {
        self.states.entry(state.into()).or_default().dimension = Some(dimension.into());
    }

    /// The recording for `state`.
    pub fn get(&self, state: &StateId) -> Option<&Recording> {
        self.states.get(state)
    }

    /// Whether `state` is present.
    pub fn contains(&self, state: &StateId) -> bool {
        self.states.contains_key(state)
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no states are present.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate `(state, recording)` pairs in solver order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateId, &Recording)> {
        self.states.iter()
    }
}

impl<S: Into<StateId>> FromIterator<(S, f64)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (state, value) in iter {
            set.push(state, value);
        }
        set
    }
}

impl ResultAccess for ResultSet {
    fn state_ids(&self) -> Box<dyn Iterator<Item = &StateId> + '_> {
        Box::new(self.states.keys())
    }

    fn last_value(&self, state: &StateId) -> Option<f64> {
        self.states.get(state).and_then(Recording::last)
    }

    fn dimension(&self, state: &StateId) -> Option<&str> {
        self.states
            .get(state)
            .and_then(|r| r.dimension.as_deref())
    }
}
