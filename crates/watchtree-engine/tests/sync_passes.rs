//! Integration test: full and incremental passes over a population network.
//!
//! Drives a `SyncContext` against the `net -> pop[i] -> cell[j]` fixture
//! and checks the pass-level guarantees: a repeated full pass creates
//! nothing new, an incremental pass appends the newest value, a watch
//! list change costs exactly one full pass, and a single missing state
//! does not stop the other leaves from updating.

use watchtree_core::{ResultSet, Sample, StateId, StepId, SyncError};
use watchtree_engine::{PassMode, SyncConfig, SyncContext, SyncState};
use watchtree_path::InstancePath;
use watchtree_test_utils::fixtures::{network, network_states, network_watch_paths};
use watchtree_tree::{SubTreeKind, Tree};

// ── helpers ─────────────────────────────────────────────────────────

fn context(pops: usize, cells: usize, vars: &[&str]) -> SyncContext {
    let mut ctx = SyncContext::new(SyncConfig::default()).unwrap();
    ctx.observation_mut()
        .extend(network_watch_paths(pops, cells, "electrical", vars));
    ctx.observation_mut().start_watch();
    ctx
}

fn results(states: &[StateId], value: f64) -> ResultSet {
    states.iter().map(|s| (s.clone(), value)).collect()
}

/// Leaf `suffix` in the watch subtree of `net.pop[p].cell[c]`.
fn cell_leaf(tree: &Tree, p: usize, c: usize, suffix: &str) -> Option<watchtree_core::NodeId> {
    let net = tree.root("net")?;
    let pop = tree.child(net, &format!("pop[{p}]"))?;
    let cell = tree.child(pop, &format!("cell[{c}]"))?;
    let aspect = tree.aspect(cell, "electrical")?;
    let watch = tree.subtree(aspect, SubTreeKind::Watch)?;
    tree.find(watch, &InstancePath::decode(suffix).ok()?)
}

fn last_value(tree: &Tree, p: usize, c: usize, suffix: &str) -> Option<f64> {
    let leaf = cell_leaf(tree, p, c, suffix)?;
    tree.node(leaf).ok()?.last_sample().map(Sample::value)
}

// ── full pass ───────────────────────────────────────────────────────

#[test]
fn repeated_full_pass_creates_nothing() {
    let states = network_states(3, 4, &["v", "m/q"]);
    let mut tree = network(3, 4, "electrical");
    let mut ctx = context(3, 4, &["v", "m.q"]);

    let first = ctx.sync(&mut tree, StepId(1), &results(&states, 1.0)).unwrap();
    assert_eq!(first.mode, PassMode::Full);
    assert_eq!(first.leaves_created, states.len());
    let nodes = tree.len();

    ctx.discard_tree();
    let second = ctx.sync(&mut tree, StepId(1), &results(&states, 1.0)).unwrap();
    assert_eq!(second.mode, PassMode::Full);
    assert_eq!(second.leaves_created, 0);
    assert_eq!(second.leaves_updated, states.len());
    assert_eq!(tree.len(), nodes);

    // Same step: the sample was replaced, not appended.
    let leaf = cell_leaf(&tree, 2, 3, "m.q").unwrap();
    assert_eq!(tree.node(leaf).unwrap().samples().unwrap().len(), 1);
    assert_eq!(ctx.mapping().len(), states.len());
}

#[test]
fn unwatched_states_leave_no_trace() {
    let states = network_states(2, 2, &["v", "u"]);
    let mut tree = network(2, 2, "electrical");
    let mut ctx = context(2, 2, &["v"]);

    let report = ctx.sync(&mut tree, StepId(1), &results(&states, 1.0)).unwrap();
    assert_eq!(report.leaves_created, 4);
    assert!(cell_leaf(&tree, 0, 0, "u").is_none());
    assert_eq!(ctx.mapping().len(), 4);
}

// ── incremental pass ────────────────────────────────────────────────

#[test]
fn incremental_pass_appends_newest_value() {
    let mut tree = network(1, 1, "electrical");
    let mut ctx = context(1, 1, &["m.q"]);
    let state = "pop/0/cell/0/m/q";

    let step1: ResultSet = [(state, 0.0)].into_iter().collect();
    ctx.sync(&mut tree, StepId(1), &step1).unwrap();

    let mut step2 = ResultSet::new();
    step2.push(state, 0.1);
    step2.push(state, 0.42);
    let report = ctx.sync(&mut tree, StepId(2), &step2).unwrap();

    assert_eq!(report.mode, PassMode::Incremental);
    assert_eq!(report.leaves_updated, 1);
    assert_eq!(last_value(&tree, 0, 0, "m.q"), Some(0.42));

    let leaf = cell_leaf(&tree, 0, 0, "m.q").unwrap();
    assert!(report.modified.contains(&leaf));
    assert!(report.modified.contains(&tree.root("net").unwrap()));
    assert!(!tree.node(leaf).unwrap().is_modified());
}

// ── state machine ───────────────────────────────────────────────────

#[test]
fn watch_change_costs_one_full_pass() {
    let states = network_states(2, 2, &["v", "u"]);
    let mut tree = network(2, 2, "electrical");
    let mut ctx = context(2, 2, &["v"]);
    let step = |n: u64| results(&states, n as f64);

    ctx.sync(&mut tree, StepId(1), &step(1)).unwrap();
    assert_eq!(ctx.observation().clean_count(), 1);
    assert_eq!(ctx.state(), SyncState::TreeCurrent);

    ctx.observation_mut()
        .add(InstancePath::decode("net.pop[1].cell[0].electrical.u").unwrap());
    assert_eq!(ctx.state(), SyncState::TreeStale);

    let report = ctx.sync(&mut tree, StepId(2), &step(2)).unwrap();
    assert_eq!(report.mode, PassMode::Full);
    assert_eq!(report.leaves_created, 1);
    assert_eq!(ctx.observation().clean_count(), 2);

    for n in 3..6 {
        let report = ctx.sync(&mut tree, StepId(n), &step(n)).unwrap();
        assert_eq!(report.mode, PassMode::Incremental);
        assert_eq!(report.leaves_updated, 5);
    }
    assert_eq!(ctx.observation().clean_count(), 2);
    assert_eq!(last_value(&tree, 1, 0, "u"), Some(5.0));
    assert_eq!(ctx.last_metrics().full_passes, 2);
    assert_eq!(ctx.last_metrics().incremental_passes, 3);
}

// ── partial failure ─────────────────────────────────────────────────

#[test]
fn one_missing_state_of_a_hundred() {
    let states = network_states(10, 10, &["v"]);
    let mut tree = network(10, 10, "electrical");
    let mut ctx = context(10, 10, &["v"]);
    ctx.sync(&mut tree, StepId(1), &results(&states, 1.0)).unwrap();

    let missing = StateId::from("pop/4/cell/7/v");
    let partial: ResultSet = states
        .iter()
        .filter(|s| **s != missing)
        .map(|s| (s.clone(), 2.0))
        .collect();

    let err = ctx.sync(&mut tree, StepId(2), &partial).unwrap_err();
    assert_eq!(
        err,
        SyncError::StateNotFound {
            missing: vec![missing.to_string()],
            total: 1,
        }
    );

    assert_eq!(last_value(&tree, 4, 7, "v"), Some(1.0));
    assert_eq!(last_value(&tree, 4, 6, "v"), Some(2.0));
    assert_eq!(last_value(&tree, 9, 9, "v"), Some(2.0));

    // The failed pass still left its modified flags on the tree.
    let modified = tree.take_modified();
    assert!(modified.contains(&cell_leaf(&tree, 0, 0, "v").unwrap()));
    assert!(!modified.contains(&cell_leaf(&tree, 4, 7, "v").unwrap()));
    assert_eq!(ctx.state(), SyncState::TreeCurrent);
}
