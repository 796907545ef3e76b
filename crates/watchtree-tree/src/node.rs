//! Node kinds and per-node state.

use std::fmt;

use indexmap::IndexMap;
use watchtree_core::{NodeId, Sample, Unit};

/// The typed subtrees every aspect owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubTreeKind {
    /// Watched state variables, populated by the sync engine.
    Watch,
    /// Visual geometry. Built by an external collaborator.
    Visualization,
    /// Static model parameters.
    Model,
}

impl SubTreeKind {
    /// All kinds, in creation order.
    pub const ALL: [SubTreeKind; 3] = [Self::Watch, Self::Visualization, Self::Model];

    /// Display name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Watch => "watch",
            Self::Visualization => "visualization",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for SubTreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a node is, and what it holds.
///
/// Child maps keep insertion order and guarantee sibling-unique names.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// A simulated entity. Owns child entities and named aspects.
    Entity {
        /// Child entities by id.
        children: IndexMap<String, NodeId>,
        /// Aspects by id.
        aspects: IndexMap<String, NodeId>,
    },
    /// A named view of an entity. Owns one subtree per [`SubTreeKind`].
    Aspect {
        /// Subtrees by kind.
        subtrees: IndexMap<SubTreeKind, NodeId>,
    },
    /// The root of a typed subtree under an aspect.
    SubTree {
        /// Which subtree this is.
        kind: SubTreeKind,
        /// Top-level composites and leaves.
        children: IndexMap<String, NodeId>,
    },
    /// An intermediate node created along a variable path.
    Composite {
        /// Nested composites and leaves.
        children: IndexMap<String, NodeId>,
    },
    /// A terminal node holding a variable's time series.
    Leaf {
        /// Recorded samples, one per step at most, oldest first.
        samples: Vec<Sample>,
        /// Display unit, when the solver declared a dimension.
        unit: Option<Unit>,
    },
}

impl NodeKind {
    /// An entity with no children and no aspects.
    pub fn entity() -> Self {
        Self::Entity {
            children: IndexMap::new(),
            aspects: IndexMap::new(),
        }
    }

    /// An empty composite.
    pub fn composite() -> Self {
        Self::Composite {
            children: IndexMap::new(),
        }
    }

    /// A leaf with no samples.
    pub fn leaf(unit: Option<Unit>) -> Self {
        Self::Leaf {
            samples: Vec::new(),
            unit,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Entity { .. } => "entity",
            Self::Aspect { .. } => "aspect",
            Self::SubTree { .. } => "subtree",
            Self::Composite { .. } => "composite",
            Self::Leaf { .. } => "leaf",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One slot of the tree arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(crate) id: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) modified: bool,
    pub(crate) watched: bool,
}

impl Node {
    pub(crate) fn new(id: impl Into<String>, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            parent,
            kind,
            modified: false,
            watched: false,
        }
    }

    /// Name of this node among its siblings.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The parent node, `None` for a root entity.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Kind and payload.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether this node or a descendant changed since the flags were
    /// last taken.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether this leaf is in the observation set.
    pub fn is_watched(&self) -> bool {
        self.watched
    }

    /// Whether this is a [`NodeKind::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Named children for entities, subtrees, and composites.
    ///
    /// Aspects and leaves have no named children and return `None`.
    pub fn children(&self) -> Option<&IndexMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Entity { children, .. }
            | NodeKind::SubTree { children, .. }
            | NodeKind::Composite { children } => Some(children),
            NodeKind::Aspect { .. } | NodeKind::Leaf { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut IndexMap<String, NodeId>> {
        match &mut self.kind {
            NodeKind::Entity { children, .. }
            | NodeKind::SubTree { children, .. }
            | NodeKind::Composite { children } => Some(children),
            NodeKind::Aspect { .. } | NodeKind::Leaf { .. } => None,
        }
    }

    /// Leaf samples, oldest first. `None` for non-leaves.
    pub fn samples(&self) -> Option<&[Sample]> {
        match &self.kind {
            NodeKind::Leaf { samples, .. } => Some(samples),
            _ => None,
        }
    }

    /// The newest leaf sample.
    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples().and_then(<[Sample]>::last)
    }

    /// Leaf unit, if one was attached at creation.
    pub fn unit(&self) -> Option<&Unit> {
        match &self.kind {
            NodeKind::Leaf { unit, .. } => unit.as_ref(),
            _ => None,
        }
    }
}

/// Append `sample`, replacing the last one if it has the same step.
///
/// Returns `true` if a sample was replaced rather than appended.
pub(crate) fn record_sample(samples: &mut Vec<Sample>, sample: Sample) -> bool {
    match samples.last_mut() {
        Some(last) if last.step == sample.step => {
            *last = sample;
            true
        }
        _ => {
            samples.push(sample);
            false
        }
    }
}
