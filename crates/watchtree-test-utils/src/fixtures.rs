//! Reusable entity hierarchies and matching state paths.
//!
//! - [`single_entity`]: one root entity `E` with one aspect.
//! - [`network`]: root `net` with `pops` populations of `cells` cells,
//!   every entity carrying the aspect.
//!
//! [`network_states`] and [`network_watch_paths`] produce the solver paths
//! and instance paths that address the same variables in a [`network`].

use watchtree_core::{NodeId, StateId};
use watchtree_path::InstancePath;
use watchtree_tree::Tree;

/// Root entity `E` with aspect `aspect`. Returns the tree and the root.
pub fn single_entity(aspect: &str) -> (Tree, NodeId) {
    let mut tree = Tree::new();
    let root = tree.add_root_entity("E").expect("fresh tree accepts a root");
    tree.add_aspect(root, aspect).expect("valid aspect id");
    (tree, root)
}

/// `net` -> `pop[i]` -> `cell[j]`, each entity with `aspect`.
pub fn network(pops: usize, cells: usize, aspect: &str) -> Tree {
    let mut tree = Tree::new();
    let net = tree.add_root_entity("net").expect("fresh tree accepts a root");
    tree.add_aspect(net, aspect).expect("valid aspect id");
    for p in 0..pops {
        let pop = tree
            .add_entity(net, &format!("pop[{p}]"))
            .expect("unique population id");
        tree.add_aspect(pop, aspect).expect("valid aspect id");
        for c in 0..cells {
            let cell = tree
                .add_entity(pop, &format!("cell[{c}]"))
                .expect("unique cell id");
            tree.add_aspect(cell, aspect).expect("valid aspect id");
        }
    }
    tree
}

/// Solver paths `pop/<p>/cell/<c>/<var>` for every cell and variable.
pub fn network_states(pops: usize, cells: usize, vars: &[&str]) -> Vec<StateId> {
    let mut out = Vec::with_capacity(pops * cells * vars.len());
    for p in 0..pops {
        for c in 0..cells {
            for var in vars {
                out.push(StateId::new(format!("pop/{p}/cell/{c}/{var}")));
            }
        }
    }
    out
}

/// Instance paths `net.pop[p].cell[c].<aspect>.<var>` matching
/// [`network_states`], in the same order.
pub fn network_watch_paths(
    pops: usize,
    cells: usize,
    aspect: &str,
    vars: &[&str],
) -> Vec<InstancePath> {
    let mut out = Vec::with_capacity(pops * cells * vars.len());
    for p in 0..pops {
        for c in 0..cells {
            for var in vars {
                let text = format!("net.pop[{p}].cell[{c}].{aspect}.{var}");
                out.push(InstancePath::decode(&text).expect("well-formed fixture path"));
            }
        }
    }
    out
}
