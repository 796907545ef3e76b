//! Hierarchical instance paths (`pop[3].v`).

use std::fmt;
use std::str::FromStr;

use watchtree_core::PathError;

use crate::codec::{is_index_literal, split_indexed, split_indexed_raw};
use crate::state::StatePath;
use crate::Segments;

/// A validated, `.`-delimited tree path.
///
/// Invariants, checked on every construction:
/// - at least one segment;
/// - no empty segment, no `.` or `/` inside a segment;
/// - no bare numeric segment: array elements are always `name[index]`.
///
/// # Examples
///
/// ```
/// use watchtree_path::InstancePath;
///
/// let path = InstancePath::decode("net.pop[3].v").unwrap();
/// assert_eq!(path.segments(), ["net", "pop[3]", "v"]);
/// assert_eq!(path.encode(), "net.pop[3].v");
/// assert!(InstancePath::decode("net.3.v").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstancePath {
    segments: Segments,
}

impl InstancePath {
    /// Parse `.`-delimited text.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidPath`] if any segment violates the grammar.
    pub fn decode(text: &str) -> Result<Self, PathError> {
        Self::from_segments(text.split('.'))
    }

    /// Render as `.`-delimited text.
    pub fn encode(&self) -> String {
        self.segments.join(".")
    }

    /// Build from already-split segments, validating each one.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Segments = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::invalid("", "instance path has no segments"));
        }
        for segment in &segments {
            if let Err(reason) = validate_segment(segment) {
                return Err(PathError::invalid(segments.join("."), reason));
            }
        }
        Ok(Self { segments })
    }

    /// A single-segment path.
    pub fn single(segment: impl Into<String>) -> Result<Self, PathError> {
        Self::from_segments([segment.into()])
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments. Always at least one.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; provided for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The innermost segment.
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The path with the innermost segment removed, or `None` for a
    /// single-segment path.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Append one segment.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidPath`] if `segment` is not a valid segment.
    pub fn child(&self, segment: &str) -> Result<Self, PathError> {
        validate_segment(segment)
            .map_err(|reason| PathError::invalid(format!("{self}.{segment}"), reason))?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Concatenate two paths.
    pub fn join(&self, suffix: &InstancePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        Self { segments }
    }

    /// Whether `prefix` is a segment-wise prefix of `self`.
    pub fn starts_with(&self, prefix: &InstancePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// The part of `self` below `prefix`.
    ///
    /// Returns `None` if `prefix` is not a proper prefix.
    pub fn strip_prefix(&self, prefix: &InstancePath) -> Option<Self> {
        if !self.starts_with(prefix) || self.len() == prefix.len() {
            return None;
        }
        Some(Self {
            segments: self.segments[prefix.len()..].iter().cloned().collect(),
        })
    }

    /// Convert back to the solver grammar: `name[i]` becomes `name`, `i`.
    pub fn to_state(&self) -> StatePath {
        let mut flat = Segments::new();
        for segment in &self.segments {
            match split_indexed_raw(segment) {
                Some((name, index)) => {
                    flat.push(name.to_string());
                    flat.push(index.to_string());
                }
                None => flat.push(segment.clone()),
            }
        }
        StatePath::from_validated(flat)
    }
}

/// Check one instance segment against the grammar.
pub(crate) fn validate_segment(segment: &str) -> Result<(), String> {
    if segment.is_empty() {
        return Err("empty segment".to_string());
    }
    if segment.contains('.') || segment.contains('/') {
        return Err(format!("segment '{segment}' contains a separator"));
    }
    if is_index_literal(segment) {
        return Err(format!("bare numeric segment '{segment}'"));
    }
    if segment.contains('[') || segment.contains(']') {
        match split_indexed(segment) {
            Some((name, _)) if !is_index_literal(name) => {}
            _ => return Err(format!("malformed array segment '{segment}'")),
        }
    }
    Ok(())
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for InstancePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_rejects_empty_segment() {
        assert!(InstancePath::decode("a..b").is_err());
        assert!(InstancePath::decode("").is_err());
        assert!(InstancePath::decode(".a").is_err());
    }

    #[test]
    fn decode_rejects_bare_numeric() {
        let err = InstancePath::decode("pop.3.v").unwrap_err();
        assert!(matches!(err, PathError::InvalidPath { .. }));
    }

    #[test]
    fn decode_rejects_malformed_brackets() {
        assert!(InstancePath::decode("pop[3.v").is_err());
        assert!(InstancePath::decode("pop[].v").is_err());
        assert!(InstancePath::decode("pop]3[.v").is_err());
        assert!(InstancePath::decode("pop[-1].v").is_err());
    }

    #[test]
    fn to_state_splits_indices() {
        let path = InstancePath::decode("net.pop[3].v").unwrap();
        assert_eq!(path.to_state().to_string(), "net/pop/3/v");
    }

    #[test]
    fn strip_prefix_yields_relative_suffix() {
        let full = InstancePath::decode("E.asp.m.q").unwrap();
        let root = InstancePath::decode("E.asp").unwrap();
        assert_eq!(full.strip_prefix(&root).unwrap().encode(), "m.q");
        assert_eq!(full.strip_prefix(&full), None);
        let other = InstancePath::decode("F").unwrap();
        assert_eq!(full.strip_prefix(&other), None);
    }

    #[test]
    fn parent_and_child_are_inverse() {
        let path = InstancePath::decode("a.b[2].c").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.encode(), "a.b[2]");
        assert_eq!(parent.child("c").unwrap(), path);
        assert!(parent.child("7").is_err());
        assert_eq!(InstancePath::decode("a").unwrap().parent(), None);
    }

    #[test]
    fn join_concatenates() {
        let a = InstancePath::decode("E.asp").unwrap();
        let b = InstancePath::decode("pop[0].v").unwrap();
        assert_eq!(a.join(&b).encode(), "E.asp.pop[0].v");
    }

    fn arb_segment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z_][a-zA-Z0-9_]{0,6}",
            ("[a-zA-Z_][a-zA-Z0-9_]{0,6}", 0u32..500).prop_map(|(n, i)| format!("{n}[{i}]")),
        ]
    }

    proptest! {
        #[test]
        fn decode_encode_round_trip(segments in proptest::collection::vec(arb_segment(), 1..8)) {
            let text = segments.join(".");
            let path = InstancePath::decode(&text).unwrap();
            prop_assert_eq!(path.encode(), text);
            prop_assert_eq!(path.segments(), segments.as_slice());
        }
    }
}
