//! Path resolution and incremental tree synchronization.
//!
//! Turns each solver step's flat results into updates of a caller-owned
//! observation tree. A full pass resolves every state path to its owning
//! entity, materializes the watched ones, and fills the path mapping. An
//! incremental pass only appends new samples to leaves that already exist.
//!
//! - [`PathResolver`]: state path to owning subtree and instance suffix.
//! - [`IncrementalUpdater`]: per-step leaf refresh.
//! - [`SyncContext`]: the per-session state machine choosing between the
//!   two passes.
//! - [`Session`]: lockstep driver owning a [`Solver`](watchtree_core::Solver)
//!   and a tree.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod resolver;
pub mod session;
pub mod sync;
pub mod updater;

pub use config::{ConfigError, MissingStateReport, SyncConfig};
pub use metrics::SyncMetrics;
pub use resolver::{PathResolver, Resolution};
pub use session::Session;
pub use sync::{PassMode, SyncContext, SyncReport, SyncState};
pub use updater::{IncrementalUpdater, UpdateOutcome};
