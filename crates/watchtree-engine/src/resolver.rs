//! Routing of flat state paths to the entity that owns them.
//!
//! The resolver walks the entity hierarchy with a two-token window over
//! the state path. At each entity it first tries the next token as a child
//! id (`pop`), then the next two fused as an array element (`pop[3]`).
//! When neither matches, the walk stops. The deepest entity on the walk
//! that has the target aspect owns the state, and everything after the
//! tokens that reached it becomes the variable suffix below its target
//! subtree.

use watchtree_core::{NodeId, PathError};
use watchtree_path::{fuse_segments, is_index_literal, InstancePath, StatePath};
use watchtree_tree::{NodeKind, SubTreeKind, Tree};

/// Where a state path lands in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// The entity that owns the state.
    pub entity: NodeId,
    /// That entity's target subtree.
    pub subtree: NodeId,
    /// Variable path below the subtree, canonicalized.
    pub suffix: InstancePath,
    /// `instance_path(subtree) + suffix`.
    pub full: InstancePath,
    /// Number of state-path segments consumed by entity descent.
    pub consumed: usize,
}

/// Resolves state paths against one aspect id and subtree kind.
///
/// Borrows the tree read-only; resolution never mutates it.
#[derive(Clone, Copy, Debug)]
pub struct PathResolver<'t> {
    tree: &'t Tree,
    aspect_id: &'t str,
    kind: SubTreeKind,
}

impl<'t> PathResolver<'t> {
    /// A resolver targeting subtree `kind` of aspects named `aspect_id`.
    pub fn new(tree: &'t Tree, aspect_id: &'t str, kind: SubTreeKind) -> Self {
        Self {
            tree,
            aspect_id,
            kind,
        }
    }

    /// Descend from `root` as far as the entity hierarchy allows.
    ///
    /// Returns the owning entity and the number of consumed segments. The
    /// state path is relative to `root`: its first segment names a child
    /// of `root`, not `root` itself. The owner is the deepest entity on
    /// the walk that has the target aspect; segments consumed below it
    /// belong to the variable suffix.
    ///
    /// # Errors
    ///
    /// [`PathError::PathNotOwned`] if no entity on the walk, `root`
    /// included, has the target aspect.
    pub fn resolve_owner(
        &self,
        root: NodeId,
        state: &StatePath,
    ) -> Result<(NodeId, usize), PathError> {
        let tokens = state.segments();
        let mut entity = root;
        let mut cursor = 0;
        let mut owner = self.target_subtree(root).map(|_| (root, 0));

        while let Some(nt1) = tokens.get(cursor) {
            if let Some(child) = self.child_entity(entity, nt1) {
                entity = child;
                cursor += 1;
            } else {
                let fused = tokens
                    .get(cursor + 1)
                    .filter(|nt2| is_index_literal(nt2))
                    .and_then(|nt2| self.child_entity(entity, &format!("{nt1}[{nt2}]")));
                match fused {
                    Some(child) => {
                        entity = child;
                        cursor += 2;
                    }
                    None => break,
                }
            }
            if self.target_subtree(entity).is_some() {
                owner = Some((entity, cursor));
            }
        }

        owner.ok_or_else(|| PathError::PathNotOwned {
            path: state.to_string(),
        })
    }

    /// Resolve `state` below `root` to its subtree and suffix.
    ///
    /// # Errors
    ///
    /// - [`PathError::PathNotOwned`] if no entity on the walk owns the
    ///   target aspect. Recoverable: try another root.
    /// - [`PathError::InvalidPath`] if entity descent consumed the whole
    ///   path, leaving no variable, or the suffix is malformed.
    pub fn resolve(&self, root: NodeId, state: &StatePath) -> Result<Resolution, PathError> {
        let (entity, consumed) = self.resolve_owner(root, state)?;
        let subtree = self
            .target_subtree(entity)
            .ok_or_else(|| PathError::PathNotOwned {
                path: state.to_string(),
            })?;

        let rest = &state.segments()[consumed..];
        if rest.is_empty() {
            return Err(PathError::invalid(
                state.to_string(),
                "path names an entity, not a variable",
            ));
        }
        let suffix = fuse_segments(rest)?;
        let base = self
            .tree
            .instance_path(subtree)
            .map_err(|e| PathError::invalid(state.to_string(), e.to_string()))?;
        Ok(Resolution {
            entity,
            subtree,
            full: base.join(&suffix),
            suffix,
            consumed,
        })
    }

    fn child_entity(&self, entity: NodeId, name: &str) -> Option<NodeId> {
        let child = self.tree.child(entity, name)?;
        matches!(self.tree.get(child)?.kind(), NodeKind::Entity { .. }).then_some(child)
    }

    fn target_subtree(&self, entity: NodeId) -> Option<NodeId> {
        let aspect = self.tree.aspect(entity, self.aspect_id)?;
        self.tree.subtree(aspect, self.kind)
    }
}
