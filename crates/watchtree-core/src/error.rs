//! Error types for the watchtree observation engine.
//!
//! Organized by failure class: path grammar and ownership
//! ([`PathError`]), solver collaborator failures ([`SolverError`]),
//! and per-pass synchronization outcomes ([`SyncError`]).

use std::error::Error;
use std::fmt;

use crate::id::StateId;

/// Errors from path parsing and path-to-owner resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The path violates the state-path or instance-path grammar
    /// (empty segment, bare numeric segment, malformed index).
    ///
    /// Fatal for the single item being processed; a synchronization
    /// pass logs it and moves on.
    InvalidPath {
        /// The offending path text.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
    /// No entity below the searched root owns this state path.
    ///
    /// Recoverable: the caller may try another candidate root.
    PathNotOwned {
        /// The state path that could not be routed.
        path: String,
    },
}

impl PathError {
    /// Shorthand for building an [`InvalidPath`](Self::InvalidPath).
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath { path, reason } => write!(f, "invalid path '{path}': {reason}"),
            Self::PathNotOwned { path } => write!(f, "no entity owns state path '{path}'"),
        }
    }
}

impl Error for PathError {}

/// Errors reported by the solver collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// The solver could not produce the next step.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "solver execution failed: {reason}"),
        }
    }
}

impl Error for SolverError {}

/// Errors surfaced to the caller by a synchronization pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// One or more watched leaves could not be updated because their
    /// state was missing from the reverse mapping or from the step
    /// results.
    ///
    /// Raised once, after the full traversal. Every other leaf was
    /// updated normally.
    StateNotFound {
        /// The identifiers that could not be found. Holds either the
        /// first miss or all of them, depending on configuration.
        missing: Vec<String>,
        /// Total number of misses during the pass.
        total: usize,
    },
    /// The solver failed to produce a step. The tree was not touched.
    BuildFailure {
        /// Description of the collaborator failure.
        reason: String,
    },
}

impl SyncError {
    /// A [`StateNotFound`](Self::StateNotFound) naming a single state.
    pub fn state_not_found(state: &StateId) -> Self {
        Self::StateNotFound {
            missing: vec![state.to_string()],
            total: 1,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateNotFound { missing, total } => {
                write!(f, "{total} watched state(s) not found in step results")?;
                if !missing.is_empty() {
                    write!(f, ": {}", missing.join(", "))?;
                }
                Ok(())
            }
            Self::BuildFailure { reason } => write!(f, "step build failed: {reason}"),
        }
    }
}

impl Error for SyncError {}

impl From<SolverError> for SyncError {
    fn from(e: SolverError) -> Self {
        Self::BuildFailure {
            reason: e.to_string(),
        }
    }
}
