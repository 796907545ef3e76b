//! Flat solver state paths (`pop/3/v`).

use std::fmt;
use std::str::FromStr;

use watchtree_core::{PathError, StateId};

use crate::codec::fuse_segments;
use crate::instance::InstancePath;
use crate::Segments;

/// A parsed, `/`-delimited solver path.
///
/// Segments are plain names or decimal array indices. A segment may also
/// already carry bracket notation (`hhpop[0]`) if the solver emits it;
/// such a segment is treated as an opaque name.
///
/// # Examples
///
/// ```
/// use watchtree_path::StatePath;
///
/// let path = StatePath::parse("net/pop/3/v").unwrap();
/// assert_eq!(path.segments(), ["net", "pop", "3", "v"]);
/// assert_eq!(path.to_instance().unwrap().encode(), "net.pop[3].v");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatePath {
    segments: Segments,
}

impl StatePath {
    /// Parse solver text.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidPath`] if any segment is empty or contains
    /// the instance separator `.`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let segments: Segments = text.split('/').map(str::to_string).collect();
        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(PathError::invalid(text, format!("empty segment at {i}")));
            }
            if segment.contains('.') {
                return Err(PathError::invalid(
                    text,
                    format!("segment '{segment}' contains '.'"),
                ));
            }
        }
        Ok(Self { segments })
    }

    /// Parse the path carried by a solver identifier.
    pub fn from_state(state: &StateId) -> Result<Self, PathError> {
        Self::parse(state.as_str())
    }

    pub(crate) fn from_validated(segments: Segments) -> Self {
        Self { segments }
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false` for a parsed path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Convert to the hierarchical grammar, fusing `name, index` pairs.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidPath`] if an index has no preceding name or a
    /// fused segment is malformed.
    pub fn to_instance(&self) -> Result<InstancePath, PathError> {
        fuse_segments(self.segments.as_slice())
    }

    /// The solver identifier for this path.
    pub fn to_state_id(&self) -> StateId {
        StateId::new(self.to_string())
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for StatePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
