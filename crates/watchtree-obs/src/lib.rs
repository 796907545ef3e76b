//! Observation bookkeeping for the watchtree engine.
//!
//! - [`ObservationSet`]: which instance paths the caller watches, plus the
//!   dirty flag that forces a full synchronization pass.
//! - [`PathMapping`]: the bidirectional state-path/instance-path cache
//!   filled during full passes and read by incremental ones.
//! - [`WatchableVariables`]: the typed catalog of variables a model can
//!   record, derived from its state paths.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod mapping;
pub mod observation;
pub mod watchable;

pub use mapping::PathMapping;
pub use observation::ObservationSet;
pub use watchable::{Variable, VariableKind, VariableType, WatchableVariables};
