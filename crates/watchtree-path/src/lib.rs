//! Path grammars for the watchtree observation engine.
//!
//! Solvers name their variables with flat, `/`-delimited state paths in
//! which an array element is two segments (`pop/3/v`). Observation trees
//! name nodes with `.`-delimited instance paths in which an array element
//! is one bracketed segment (`pop[3].v`). This crate converts between the
//! two without touching any tree:
//!
//! - [`StatePath`]: parsed solver path.
//! - [`InstancePath`]: validated tree path; never holds a bare numeric
//!   or empty segment.
//! - [`to_instance_segment`]: the lookahead-by-one fusion rule.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod instance;
pub mod state;

pub use codec::{fuse_segments, is_index_literal, split_indexed, to_instance_segment};
pub use instance::InstancePath;
pub use state::StatePath;

/// Inline storage for path segments. Most model paths are shallow enough
/// to avoid a heap allocation for the segment list itself.
pub type Segments = smallvec::SmallVec<[String; 8]>;
