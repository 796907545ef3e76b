//! Strongly-typed identifiers.

use std::fmt;

/// Index of a node within a tree arena.
///
/// Nodes are allocated sequentially and never freed while the tree lives,
/// so `NodeId(n)` is the n-th node ever allocated in its arena. A `NodeId`
/// is only meaningful for the tree that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The arena slot this id addresses.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing simulation step counter.
///
/// Incremented each time the solver produces a new result mapping.
/// `StepId(0)` is the state before the first step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Opaque solver-native identifier of one recordable state variable.
///
/// The text is the solver's flat state path (e.g. `"hhpop/0/v"`). The
/// engine never interprets it beyond parsing it as a `StatePath` during
/// reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(String);

impl StateId {
    /// Wrap a solver state path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The raw solver path text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for StateId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl AsRef<str> for StateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
