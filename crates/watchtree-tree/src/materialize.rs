//! Lazy materialization of watched variables under a subtree.

use tracing::trace;
use watchtree_core::{NodeId, Sample, Unit};
use watchtree_path::InstancePath;

use crate::error::TreeError;
use crate::tree::Tree;

/// Outcome of a successful [`materialize`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Materialized {
    /// The terminal leaf.
    pub leaf: NodeId,
    /// Whether the leaf was created by this call.
    pub created: bool,
}

/// Walk `suffix` below `subtree`, creating whatever is missing, and record
/// `sample` at the terminal leaf.
///
/// Existing composites are descended into. A missing inner segment becomes
/// a composite; a missing terminal segment becomes a leaf carrying `unit`.
/// The leaf is marked watched even when there is no sample to record, so a
/// state with no values yet still gets its node. `modified` is propagated
/// to the root entity when the leaf was created or received a sample.
///
/// Conflicts can only involve nodes that already exist, so a failed call
/// leaves the tree unchanged.
///
/// # Errors
///
/// [`TreeError::KindConflict`] if an inner segment names an existing leaf
/// or the terminal segment names an existing container.
/// [`TreeError::NotAContainer`] if `subtree` cannot hold variables.
pub fn materialize(
    tree: &mut Tree,
    subtree: NodeId,
    suffix: &InstancePath,
    sample: Option<Sample>,
    unit: Option<Unit>,
) -> Result<Materialized, TreeError> {
    tree.require_variable_container(subtree)?;
    let tokens = suffix.segments();
    let mut current = subtree;
    let mut created = false;

    for (i, token) in tokens.iter().enumerate() {
        let terminal = i + 1 == tokens.len();
        match tree.child(current, token) {
            Some(existing) => {
                let node = tree.node(existing)?;
                if node.is_leaf() != terminal {
                    let expected = if terminal { "leaf" } else { "composite" };
                    let reason = format!("expected {expected}, found {}", node.kind());
                    return Err(TreeError::KindConflict {
                        path: tree.instance_path(existing)?.encode(),
                        reason,
                    });
                }
                current = existing;
            }
            None if terminal => {
                current = tree.add_leaf(current, token, unit.clone())?;
                created = true;
                trace!(node = %current, leaf = %token, "created leaf");
            }
            None => {
                current = tree.add_composite(current, token)?;
                trace!(node = %current, composite = %token, "created composite");
            }
        }
    }

    if let Some(sample) = sample {
        tree.record(current, sample)?;
    }
    tree.set_watched(current, true)?;
    if created || sample.is_some() {
        tree.propagate_modified(current)?;
    }
    Ok(Materialized {
        leaf: current,
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::node::SubTreeKind;
    use watchtree_core::StepId;

    fn watch_subtree() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let e = tree.add_root_entity("E").unwrap();
        let asp = tree.add_aspect(e, "asp").unwrap();
        let watch = tree.subtree(asp, SubTreeKind::Watch).unwrap();
        (tree, e, watch)
    }

    fn path(text: &str) -> InstancePath {
        InstancePath::decode(text).unwrap()
    }

    fn at(step: u64, value: f64) -> Option<Sample> {
        Some(Sample::new(StepId(step), value))
    }

    #[test]
    fn creates_composites_and_leaf() {
        let (mut tree, e, watch) = watch_subtree();
        let out = materialize(
            &mut tree,
            watch,
            &path("m.q"),
            at(1, 0.5),
            Some(Unit::new("mV")),
        )
        .unwrap();
        assert!(out.created);

        let m = tree.child(watch, "m").unwrap();
        assert!(!tree.node(m).unwrap().is_leaf());
        let leaf = tree.node(out.leaf).unwrap();
        assert!(leaf.is_watched());
        assert_eq!(leaf.last_sample().unwrap().value(), 0.5);
        assert_eq!(leaf.unit().unwrap().symbol(), "mV");
        assert_eq!(tree.instance_path(out.leaf).unwrap().encode(), "E.asp.m.q");
        assert!(tree.node(e).unwrap().is_modified());
    }

    #[test]
    fn second_call_reuses_nodes() {
        let (mut tree, _, watch) = watch_subtree();
        let first = materialize(&mut tree, watch, &path("m.q"), at(1, 1.0), None).unwrap();
        let slots = tree.len();
        let second = materialize(&mut tree, watch, &path("m.h"), at(1, 2.0), None).unwrap();
        assert_eq!(tree.len(), slots + 1);
        assert_ne!(first.leaf, second.leaf);
        let m = tree.child(watch, "m").unwrap();
        assert_eq!(tree.node(m).unwrap().children().unwrap().len(), 2);
    }

    #[test]
    fn same_step_is_idempotent() {
        let (mut tree, _, watch) = watch_subtree();
        let sample = at(4, 0.42);
        let a = materialize(&mut tree, watch, &path("v"), sample, None).unwrap();
        let slots = tree.len();
        let b = materialize(&mut tree, watch, &path("v"), sample, None).unwrap();
        assert_eq!(a.leaf, b.leaf);
        assert!(!b.created);
        assert_eq!(tree.len(), slots);
        assert_eq!(tree.node(a.leaf).unwrap().samples().unwrap().len(), 1);
    }

    #[test]
    fn no_sample_still_creates_watched_leaf() {
        let (mut tree, e, watch) = watch_subtree();
        let out = materialize(&mut tree, watch, &path("m.q"), None, None).unwrap();
        assert!(out.created);
        let leaf = tree.node(out.leaf).unwrap();
        assert!(leaf.is_watched());
        assert!(leaf.last_sample().is_none());
        assert!(tree.node(e).unwrap().is_modified());

        tree.take_modified();
        let again = materialize(&mut tree, watch, &path("m.q"), None, None).unwrap();
        assert!(!again.created);
        assert!(!tree.node(e).unwrap().is_modified());
    }

    #[test]
    fn leaf_in_the_middle_conflicts() {
        let (mut tree, _, watch) = watch_subtree();
        materialize(&mut tree, watch, &path("m"), at(1, 1.0), None).unwrap();
        let slots = tree.len();
        let err = materialize(&mut tree, watch, &path("m.q"), at(1, 1.0), None).unwrap_err();
        assert!(matches!(err, TreeError::KindConflict { ref path, .. } if path == "E.asp.m"));
        assert_eq!(tree.len(), slots);
    }

    #[test]
    fn composite_at_terminal_conflicts() {
        let (mut tree, _, watch) = watch_subtree();
        materialize(&mut tree, watch, &path("m.q"), at(1, 1.0), None).unwrap();
        let err = materialize(&mut tree, watch, &path("m"), at(1, 1.0), None).unwrap_err();
        assert!(matches!(err, TreeError::KindConflict { .. }));
    }

    #[test]
    fn entity_is_not_a_variable_container() {
        let (mut tree, e, _) = watch_subtree();
        let err = materialize(&mut tree, e, &path("v"), at(1, 1.0), None).unwrap_err();
        assert!(matches!(err, TreeError::NotAContainer { .. }));
    }

    proptest! {
        #[test]
        fn second_round_creates_nothing(
            suffixes in proptest::collection::vec(
                proptest::collection::vec("[abc]", 1..4),
                1..12,
            ),
        ) {
            let (mut tree, _, watch) = watch_subtree();
            let suffixes: Vec<InstancePath> = suffixes
                .iter()
                .map(|segments| InstancePath::from_segments(segments.iter().cloned()).unwrap())
                .collect();
            let first: Vec<bool> = suffixes
                .iter()
                .map(|s| materialize(&mut tree, watch, s, at(1, 1.0), None).is_ok())
                .collect();
            let slots = tree.len();
            for (suffix, ok) in suffixes.iter().zip(first) {
                let again = materialize(&mut tree, watch, suffix, at(1, 2.0), None);
                prop_assert_eq!(again.is_ok(), ok);
                if let Ok(m) = again {
                    prop_assert!(!m.created);
                }
            }
            prop_assert_eq!(tree.len(), slots);
        }
    }
}
