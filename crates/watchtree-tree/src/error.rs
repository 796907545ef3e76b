//! Errors from tree construction and materialization.

use std::error::Error;
use std::fmt;

use watchtree_core::{NodeId, PathError};

/// Errors from [`Tree`](crate::Tree) operations and
/// [`materialize`](crate::materialize()).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The id does not address a node of this tree.
    UnknownNode {
        /// The offending id.
        node: NodeId,
    },
    /// The operation needs a node that can hold children of the requested
    /// kind.
    NotAContainer {
        /// The node that cannot hold the child.
        node: NodeId,
    },
    /// An existing node has the wrong kind for its position: a leaf in the
    /// middle of a path, or a container where a leaf is expected.
    ///
    /// Isolated to the single item being materialized.
    KindConflict {
        /// Instance path of the conflicting node.
        path: String,
        /// What was expected there.
        reason: String,
    },
    /// A sibling with the same name already exists.
    DuplicateChild {
        /// Instance path the new node would have had.
        path: String,
    },
    /// A node name is not a valid instance-path segment.
    Path(PathError),
    /// The arena cannot address any more nodes.
    CapacityExceeded,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { node } => write!(f, "unknown node {node}"),
            Self::NotAContainer { node } => {
                write!(f, "node {node} cannot hold children of this kind")
            }
            Self::KindConflict { path, reason } => {
                write!(f, "kind conflict at '{path}': {reason}")
            }
            Self::DuplicateChild { path } => write!(f, "'{path}' already exists"),
            Self::Path(e) => write!(f, "path: {e}"),
            Self::CapacityExceeded => write!(f, "tree arena exceeds u32::MAX nodes"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Path(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PathError> for TreeError {
    fn from(e: PathError) -> Self {
        Self::Path(e)
    }
}
