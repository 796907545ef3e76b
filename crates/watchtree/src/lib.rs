//! watchtree: incremental synchronization of flat solver state into a
//! hierarchical observation tree.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all watchtree sub-crates. For most users, adding `watchtree` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use watchtree::prelude::*;
//!
//! // A solver that reports the same membrane potential every step.
//! struct Constant;
//! impl Solver for Constant {
//!     fn advance(&mut self) -> Result<ResultSet, SolverError> {
//!         Ok([("hhpop/0/v", -65.0)].into_iter().collect())
//!     }
//! }
//!
//! let mut tree = Tree::new();
//! let net = tree.add_root_entity("net").unwrap();
//! let pop = tree.add_entity(net, "hhpop[0]").unwrap();
//! tree.add_aspect(pop, "electrical").unwrap();
//!
//! let mut session = Session::new(SyncConfig::default(), Constant, tree).unwrap();
//! session.watch("net.hhpop[0].electrical.v").unwrap();
//! session.start_watch();
//!
//! let report = session.step().unwrap();
//! assert_eq!(report.mode, PassMode::Full);
//! assert_eq!(report.leaves_created, 1);
//! assert_eq!(session.step().unwrap().mode, PassMode::Incremental);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `watchtree-core` | IDs, samples, errors, units, collaborator traits |
//! | [`path`] | `watchtree-path` | State and instance paths, segment fusion |
//! | [`tree`] | `watchtree-tree` | Node arena, traversal, leaf materialization |
//! | [`obs`] | `watchtree-obs` | Watch list, path mapping, variable catalog |
//! | [`engine`] | `watchtree-engine` | Resolver, updater, sync state machine, session |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`watchtree-core`).
///
/// Contains the error types, [`types::Unit`] derivation, and the
/// collaborator traits ([`types::Solver`], [`types::ResultAccess`],
/// [`types::ModelDescription`]).
pub use watchtree_core as types;

/// Path codec (`watchtree-path`).
///
/// Converts solver paths ([`path::StatePath`]) to canonical instance
/// paths ([`path::InstancePath`]) and back.
pub use watchtree_path as path;

/// The observation tree (`watchtree-tree`).
pub use watchtree_tree as tree;

/// Watch list and path caches (`watchtree-obs`).
pub use watchtree_obs as obs;

/// Synchronization engine (`watchtree-engine`).
///
/// [`engine::SyncContext`] for driving passes against a caller-owned tree,
/// [`engine::Session`] for lockstep stepping of a solver.
pub use watchtree_engine as engine;

/// Common imports for typical watchtree usage.
///
/// ```rust
/// use watchtree::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use watchtree_core::{
        ModelDescription, NodeId, ResultAccess, ResultSet, Sample, Solver, StateId, StepId, Unit,
    };

    // Errors
    pub use watchtree_core::{PathError, SolverError, SyncError};
    pub use watchtree_tree::TreeError;

    // Paths
    pub use watchtree_path::{InstancePath, StatePath};

    // Tree
    pub use watchtree_tree::{Node, NodeKind, SubTreeKind, Tree};

    // Observation
    pub use watchtree_obs::{ObservationSet, PathMapping, WatchableVariables};

    // Engine
    pub use watchtree_engine::{
        ConfigError, PassMode, Session, SyncConfig, SyncContext, SyncMetrics, SyncReport,
        SyncState,
    };
}
