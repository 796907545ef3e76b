//! Core types and traits for the watchtree observation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the watchtree workspace:
//! type IDs, samples, error types, unit derivation, and the traits that
//! decouple the synchronization engine from the solver and the model
//! description.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod quantity;
pub mod results;
pub mod traits;
pub mod units;

pub use error::{PathError, SolverError, SyncError};
pub use id::{NodeId, StateId, StepId};
pub use quantity::{Quantity, Sample};
pub use results::{Recording, ResultSet};
pub use traits::{ModelDescription, ResultAccess, Solver};
pub use units::{Unit, UnitError};
