//! Observation tree for the watchtree engine.
//!
//! The tree is an arena of [`Node`]s addressed by
//! [`NodeId`](watchtree_core::NodeId). Parents are stored as indices,
//! so modified-flag propagation walks upward without reference cycles.
//!
//! - [`Tree`]: the arena, the entity/aspect builder API, and traversal.
//! - [`materialize`]: lazily creates composite and leaf nodes along an
//!   instance suffix and records a sample at the leaf.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod materialize;
pub mod node;
pub mod tree;

pub use error::TreeError;
pub use materialize::{materialize, Materialized};
pub use node::{Node, NodeKind, SubTreeKind};
pub use tree::Tree;
