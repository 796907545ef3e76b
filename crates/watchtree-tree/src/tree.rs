//! The node arena and its entity/aspect builder API.

use indexmap::IndexMap;
use watchtree_core::{NodeId, Sample, Unit};
use watchtree_path::InstancePath;

use crate::error::TreeError;
use crate::node::{record_sample, Node, NodeKind, SubTreeKind};

/// An arena-backed observation tree.
///
/// Nodes are allocated sequentially and never freed. Detaching a subtree's
/// contents with [`clear_subtree`](Tree::clear_subtree) leaves the old
/// slots unreachable; [`len`](Tree::len) counts arena slots, not reachable
/// nodes.
///
/// Instance paths skip the subtree level: a leaf `q` under composite `m`
/// in the watch subtree of aspect `asp` of entity `E` has path `E.asp.m.q`.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    roots: IndexMap<String, NodeId>,
}

impl Tree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of arena slots.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was ever allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root entities, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.values().copied()
    }

    /// The root entity named `id`.
    pub fn root(&self, id: &str) -> Option<NodeId> {
        self.roots.get(id).copied()
    }

    /// Look up a node.
    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.index())
    }

    /// Look up a node, failing on a foreign id.
    pub fn node(&self, node: NodeId) -> Result<&Node, TreeError> {
        self.get(node).ok_or(TreeError::UnknownNode { node })
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(node.index())
            .ok_or(TreeError::UnknownNode { node })
    }

    fn alloc(&mut self, node: Node) -> Result<NodeId, TreeError> {
        let id = u32::try_from(self.nodes.len()).map_err(|_| TreeError::CapacityExceeded)?;
        self.nodes.push(node);
        Ok(NodeId(id))
    }

    // ── Builder ─────────────────────────────────────────────────

    /// Create a top-level entity.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateChild`] if a root with this id exists, or
    /// [`TreeError::Path`] if `id` is not a valid path segment.
    pub fn add_root_entity(&mut self, id: &str) -> Result<NodeId, TreeError> {
        InstancePath::single(id)?;
        if self.roots.contains_key(id) {
            return Err(TreeError::DuplicateChild {
                path: id.to_string(),
            });
        }
        let node = self.alloc(Node::new(id, None, NodeKind::entity()))?;
        self.roots.insert(id.to_string(), node);
        Ok(node)
    }

    /// Create a child entity under `parent`, which must be an entity.
    pub fn add_entity(&mut self, parent: NodeId, id: &str) -> Result<NodeId, TreeError> {
        if !matches!(self.node(parent)?.kind, NodeKind::Entity { .. }) {
            return Err(TreeError::NotAContainer { node: parent });
        }
        self.attach(parent, id, NodeKind::entity())
    }

    /// Create an aspect under `entity`, together with one empty subtree of
    /// every [`SubTreeKind`].
    pub fn add_aspect(&mut self, entity: NodeId, id: &str) -> Result<NodeId, TreeError> {
        InstancePath::single(id)?;
        match &self.node(entity)?.kind {
            NodeKind::Entity { aspects, .. } if aspects.contains_key(id) => {
                return Err(TreeError::DuplicateChild {
                    path: format!("{}.{id}", self.display_path(entity)),
                });
            }
            NodeKind::Entity { .. } => {}
            _ => return Err(TreeError::NotAContainer { node: entity }),
        }

        let aspect = self.alloc(Node::new(
            id,
            Some(entity),
            NodeKind::Aspect {
                subtrees: IndexMap::new(),
            },
        ))?;
        for kind in SubTreeKind::ALL {
            let subtree = self.alloc(Node::new(
                kind.name(),
                Some(aspect),
                NodeKind::SubTree {
                    kind,
                    children: IndexMap::new(),
                },
            ))?;
            if let NodeKind::Aspect { subtrees } = &mut self.node_mut(aspect)?.kind {
                subtrees.insert(kind, subtree);
            }
        }
        if let NodeKind::Entity { aspects, .. } = &mut self.node_mut(entity)?.kind {
            aspects.insert(id.to_string(), aspect);
        }
        Ok(aspect)
    }

    /// Create an empty composite under a subtree or composite.
    pub fn add_composite(&mut self, parent: NodeId, id: &str) -> Result<NodeId, TreeError> {
        self.require_variable_container(parent)?;
        self.attach(parent, id, NodeKind::composite())
    }

    /// Create an empty leaf under a subtree or composite.
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        id: &str,
        unit: Option<Unit>,
    ) -> Result<NodeId, TreeError> {
        self.require_variable_container(parent)?;
        self.attach(parent, id, NodeKind::leaf(unit))
    }

    pub(crate) fn require_variable_container(&self, node: NodeId) -> Result<(), TreeError> {
        match self.node(node)?.kind {
            NodeKind::SubTree { .. } | NodeKind::Composite { .. } => Ok(()),
            _ => Err(TreeError::NotAContainer { node }),
        }
    }

    fn attach(&mut self, parent: NodeId, id: &str, kind: NodeKind) -> Result<NodeId, TreeError> {
        InstancePath::single(id)?;
        let children = self
            .node(parent)?
            .children()
            .ok_or(TreeError::NotAContainer { node: parent })?;
        if children.contains_key(id) {
            return Err(TreeError::DuplicateChild {
                path: format!("{}.{id}", self.display_path(parent)),
            });
        }
        let node = self.alloc(Node::new(id, Some(parent), kind))?;
        if let Some(children) = self.node_mut(parent)?.children_mut() {
            children.insert(id.to_string(), node);
        }
        Ok(node)
    }

    // ── Lookup ──────────────────────────────────────────────────

    /// Named child of an entity, subtree, or composite.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.get(parent)?.children()?.get(name).copied()
    }

    /// Aspect `id` of `entity`.
    pub fn aspect(&self, entity: NodeId, id: &str) -> Option<NodeId> {
        match &self.get(entity)?.kind {
            NodeKind::Entity { aspects, .. } => aspects.get(id).copied(),
            _ => None,
        }
    }

    /// Subtree of `kind` under `aspect`.
    pub fn subtree(&self, aspect: NodeId, kind: SubTreeKind) -> Option<NodeId> {
        match &self.get(aspect)?.kind {
            NodeKind::Aspect { subtrees } => subtrees.get(&kind).copied(),
            _ => None,
        }
    }

    /// Find the node at `suffix` below `start`, following named children.
    pub fn find(&self, start: NodeId, suffix: &InstancePath) -> Option<NodeId> {
        suffix
            .segments()
            .iter()
            .try_fold(start, |node, segment| self.child(node, segment))
    }

    /// Every subtree of `kind` under an aspect named `aspect_id`, across
    /// all entities, in depth-first entity order.
    pub fn target_subtrees(&self, aspect_id: &str, kind: SubTreeKind) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.values().rev().copied().collect();
        while let Some(entity) = stack.pop() {
            let Some(NodeKind::Entity { children, aspects }) = self.get(entity).map(Node::kind)
            else {
                continue;
            };
            if let Some(subtree) = aspects
                .get(aspect_id)
                .and_then(|&aspect| self.subtree(aspect, kind))
            {
                found.push(subtree);
            }
            stack.extend(children.values().rev().copied());
        }
        found
    }

    /// Instance path of `node`, from its root entity.
    ///
    /// The subtree level is not part of the path, so a subtree shares its
    /// aspect's path.
    pub fn instance_path(&self, node: NodeId) -> Result<InstancePath, TreeError> {
        let mut segments = Vec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let current = self.node(id)?;
            if !matches!(current.kind, NodeKind::SubTree { .. }) {
                segments.push(current.id.clone());
            }
            cursor = current.parent;
        }
        segments.reverse();
        Ok(InstancePath::from_segments(segments)?)
    }

    // ── Traversal ───────────────────────────────────────────────

    /// Pre-order depth-first walk from `start`, children in insertion
    /// order. Entities yield their aspects before their child entities.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            order.push(id);
            match &node.kind {
                NodeKind::Entity { children, aspects } => {
                    stack.extend(children.values().rev().copied());
                    stack.extend(aspects.values().rev().copied());
                }
                NodeKind::Aspect { subtrees } => stack.extend(subtrees.values().rev().copied()),
                NodeKind::SubTree { children, .. } | NodeKind::Composite { children } => {
                    stack.extend(children.values().rev().copied());
                }
                NodeKind::Leaf { .. } => {}
            }
        }
        order
    }

    /// Leaves below `start`, in depth-first order.
    pub fn leaves(&self, start: NodeId) -> Vec<NodeId> {
        self.descendants(start)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(Node::is_leaf))
            .collect()
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Record `sample` on a leaf, replacing a sample of the same step.
    ///
    /// Returns `true` if an existing sample was replaced.
    pub fn record(&mut self, leaf: NodeId, sample: Sample) -> Result<bool, TreeError> {
        let node = self.node_mut(leaf)?;
        if let NodeKind::Leaf { samples, .. } = &mut node.kind {
            return Ok(record_sample(samples, sample));
        }
        let reason = format!("expected leaf, found {}", node.kind);
        Err(TreeError::KindConflict {
            path: self.display_path(leaf),
            reason,
        })
    }

    /// Set the watched flag of a node.
    pub fn set_watched(&mut self, node: NodeId, watched: bool) -> Result<(), TreeError> {
        self.node_mut(node)?.watched = watched;
        Ok(())
    }

    /// Mark `from` and every ancestor up to its root entity as modified.
    pub fn propagate_modified(&mut self, from: NodeId) -> Result<(), TreeError> {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let node = self.node_mut(id)?;
            node.modified = true;
            cursor = node.parent;
        }
        Ok(())
    }

    /// Collect every reachable modified node in depth-first order and clear
    /// the flags.
    pub fn take_modified(&mut self) -> Vec<NodeId> {
        let reachable: Vec<NodeId> = self
            .roots
            .values()
            .flat_map(|&root| self.descendants(root))
            .collect();
        let mut modified = Vec::new();
        for id in reachable {
            if let Some(node) = self.nodes.get_mut(id.index()) {
                if node.modified {
                    node.modified = false;
                    modified.push(id);
                }
            }
        }
        modified
    }

    /// Detach every child of a subtree.
    ///
    /// Detached nodes keep their arena slots but lose their flags and are
    /// no longer reachable.
    pub fn clear_subtree(&mut self, subtree: NodeId) -> Result<(), TreeError> {
        let detached: Vec<NodeId> = match &mut self.node_mut(subtree)?.kind {
            NodeKind::SubTree { children, .. } => children.drain(..).map(|(_, id)| id).collect(),
            _ => return Err(TreeError::NotAContainer { node: subtree }),
        };
        for root in detached {
            for id in self.descendants(root) {
                if let Some(node) = self.nodes.get_mut(id.index()) {
                    node.modified = false;
                    node.watched = false;
                }
            }
        }
        Ok(())
    }

    /// Whether a subtree has no children.
    pub fn is_subtree_empty(&self, subtree: NodeId) -> bool {
        self.get(subtree)
            .and_then(Node::children)
            .is_none_or(|children| children.is_empty())
    }

    fn display_path(&self, node: NodeId) -> String {
        self.instance_path(node)
            .map(|p| p.encode())
            .unwrap_or_else(|_| node.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchtree_core::StepId;

    /// `net` with child entity `pop[0]`, each with an `electrical` aspect.
    fn two_level() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let net = tree.add_root_entity("net").unwrap();
        tree.add_aspect(net, "electrical").unwrap();
        let pop = tree.add_entity(net, "pop[0]").unwrap();
        tree.add_aspect(pop, "electrical").unwrap();
        (tree, net, pop)
    }

    // ── builder ─────────────────────────────────────────────────

    #[test]
    fn aspect_creates_every_subtree() {
        let (tree, net, _) = two_level();
        let aspect = tree.aspect(net, "electrical").unwrap();
        for kind in SubTreeKind::ALL {
            let subtree = tree.subtree(aspect, kind).unwrap();
            assert!(tree.is_subtree_empty(subtree));
        }
    }

    #[test]
    fn duplicate_names_rejected() {
        let (mut tree, net, _) = two_level();
        assert!(matches!(
            tree.add_root_entity("net"),
            Err(TreeError::DuplicateChild { .. })
        ));
        assert!(matches!(
            tree.add_entity(net, "pop[0]"),
            Err(TreeError::DuplicateChild { .. })
        ));
        assert!(matches!(
            tree.add_aspect(net, "electrical"),
            Err(TreeError::DuplicateChild { .. })
        ));
    }

    #[test]
    fn invalid_names_rejected() {
        let mut tree = Tree::new();
        assert!(matches!(
            tree.add_root_entity("3"),
            Err(TreeError::Path(_))
        ));
        assert!(matches!(
            tree.add_root_entity("a.b"),
            Err(TreeError::Path(_))
        ));
    }

    #[test]
    fn leaves_only_under_variable_containers() {
        let (mut tree, net, _) = two_level();
        assert!(matches!(
            tree.add_leaf(net, "v", None),
            Err(TreeError::NotAContainer { .. })
        ));
        let aspect = tree.aspect(net, "electrical").unwrap();
        assert!(matches!(
            tree.add_composite(aspect, "m"),
            Err(TreeError::NotAContainer { .. })
        ));
    }

    #[test]
    fn unknown_node_reported() {
        let tree = Tree::new();
        assert_eq!(
            tree.node(NodeId(7)).unwrap_err(),
            TreeError::UnknownNode { node: NodeId(7) }
        );
    }

    // ── paths ───────────────────────────────────────────────────

    #[test]
    fn subtree_shares_aspect_path() {
        let (mut tree, _, pop) = two_level();
        let aspect = tree.aspect(pop, "electrical").unwrap();
        let watch = tree.subtree(aspect, SubTreeKind::Watch).unwrap();
        let m = tree.add_composite(watch, "m").unwrap();
        let q = tree.add_leaf(m, "q", None).unwrap();
        assert_eq!(tree.instance_path(watch).unwrap().encode(), "net.pop[0].electrical");
        assert_eq!(tree.instance_path(q).unwrap().encode(), "net.pop[0].electrical.m.q");
        let suffix = InstancePath::decode("m.q").unwrap();
        assert_eq!(tree.find(watch, &suffix), Some(q));
    }

    #[test]
    fn target_subtrees_visit_every_entity() {
        let (tree, net, pop) = two_level();
        let found = tree.target_subtrees("electrical", SubTreeKind::Watch);
        let expected: Vec<NodeId> = [net, pop]
            .iter()
            .map(|&e| {
                let aspect = tree.aspect(e, "electrical").unwrap();
                tree.subtree(aspect, SubTreeKind::Watch).unwrap()
            })
            .collect();
        assert_eq!(found, expected);
        assert!(tree.target_subtrees("mechanical", SubTreeKind::Watch).is_empty());
    }

    // ── flags ───────────────────────────────────────────────────

    #[test]
    fn modified_propagates_to_root() {
        let (mut tree, net, pop) = two_level();
        let aspect = tree.aspect(pop, "electrical").unwrap();
        let watch = tree.subtree(aspect, SubTreeKind::Watch).unwrap();
        let v = tree.add_leaf(watch, "v", None).unwrap();
        tree.propagate_modified(v).unwrap();

        for id in [v, watch, aspect, pop, net] {
            assert!(tree.node(id).unwrap().is_modified(), "{id} not modified");
        }
        let other = tree.aspect(net, "electrical").unwrap();
        assert!(!tree.node(other).unwrap().is_modified());

        let taken = tree.take_modified();
        assert_eq!(taken, vec![net, pop, aspect, watch, v]);
        assert!(tree.take_modified().is_empty());
    }

    #[test]
    fn record_rejects_non_leaf() {
        let (mut tree, net, _) = two_level();
        assert!(matches!(
            tree.record(net, Sample::new(StepId(1), 1.0)),
            Err(TreeError::KindConflict { .. })
        ));
    }

    #[test]
    fn clear_subtree_detaches_children() {
        let (mut tree, net, _) = two_level();
        let aspect = tree.aspect(net, "electrical").unwrap();
        let watch = tree.subtree(aspect, SubTreeKind::Watch).unwrap();
        let v = tree.add_leaf(watch, "v", None).unwrap();
        tree.set_watched(v, true).unwrap();
        tree.propagate_modified(v).unwrap();

        tree.clear_subtree(watch).unwrap();
        assert!(tree.is_subtree_empty(watch));
        assert!(!tree.node(v).unwrap().is_watched());
        assert!(!tree.take_modified().contains(&v));
        assert!(matches!(
            tree.clear_subtree(aspect),
            Err(TreeError::NotAContainer { .. })
        ));
    }
}
