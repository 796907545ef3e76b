//! Benchmark profiles for the watchtree synchronization engine.
//!
//! Each profile describes a `net -> pop[i] -> cell[j]` network and the
//! variables recorded on every cell:
//!
//! - [`reference_profile`]: 10 populations of 100 cells, 3 variables (3K states)
//! - [`stress_profile`]: 50 populations of 200 cells, 4 variables (40K states)

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use watchtree_core::{ResultSet, StateId, StepId};
use watchtree_engine::{ConfigError, SyncConfig, SyncContext};
use watchtree_path::InstancePath;
use watchtree_test_utils::fixtures;
use watchtree_tree::Tree;

/// Shape of a benchmark network.
#[derive(Clone, Debug)]
pub struct Profile {
    /// Number of populations under the root.
    pub pops: usize,
    /// Cells per population.
    pub cells: usize,
    /// Variables recorded on every cell, in solver form (`m/q`).
    pub vars: Vec<&'static str>,
}

/// 3K states.
pub fn reference_profile() -> Profile {
    Profile {
        pops: 10,
        cells: 100,
        vars: vec!["v", "m/q", "h/q"],
    }
}

/// 40K states.
pub fn stress_profile() -> Profile {
    Profile {
        pops: 50,
        cells: 200,
        vars: vec!["v", "m/q", "h/q", "n/q"],
    }
}

impl Profile {
    /// Total number of recorded states.
    pub fn state_count(&self) -> usize {
        self.pops * self.cells * self.vars.len()
    }

    /// The entity hierarchy, with no variables yet.
    pub fn tree(&self) -> Tree {
        fixtures::network(self.pops, self.cells, "electrical")
    }

    /// Solver identifiers for every variable of every cell.
    pub fn states(&self) -> Vec<StateId> {
        fixtures::network_states(self.pops, self.cells, &self.vars)
    }

    /// Instance paths matching [`states`](Self::states).
    pub fn watch_paths(&self) -> Vec<InstancePath> {
        let vars: Vec<String> = self.vars.iter().map(|v| v.replace('/', ".")).collect();
        let vars: Vec<&str> = vars.iter().map(String::as_str).collect();
        fixtures::network_watch_paths(self.pops, self.cells, "electrical", &vars)
    }

    /// One step of results, every state set to `value`.
    pub fn results(&self, value: f64) -> ResultSet {
        self.states().into_iter().map(|s| (s, value)).collect()
    }

    /// A context watching every variable, already past its first full
    /// pass, so the next sync is incremental.
    pub fn warmed_up(&self) -> Result<(Tree, SyncContext), ConfigError> {
        let mut tree = self.tree();
        let mut ctx = SyncContext::new(SyncConfig::default())?;
        ctx.observation_mut().extend(self.watch_paths());
        ctx.observation_mut().start_watch();
        // A full pass never reports missing states.
        let _ = ctx.sync(&mut tree, StepId(1), &self.results(0.0));
        Ok((tree, ctx))
    }
}
