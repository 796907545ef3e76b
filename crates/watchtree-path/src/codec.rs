//! Segment-level conversion between the flat and the hierarchical grammar.
//!
//! All functions here are pure and deterministic.

use watchtree_core::PathError;

use crate::instance::InstancePath;

/// Whether `segment` is a non-negative integer literal.
///
/// Only plain ASCII digits qualify, and the value must fit in a `u64`.
/// A sign, a decimal point, whitespace, or an empty string disqualifies.
///
/// ```
/// use watchtree_path::is_index_literal;
///
/// assert!(is_index_literal("0"));
/// assert!(is_index_literal("42"));
/// assert!(!is_index_literal("+3"));
/// assert!(!is_index_literal("-1"));
/// assert!(!is_index_literal("3.0"));
/// assert!(!is_index_literal(""));
/// ```
pub fn is_index_literal(segment: &str) -> bool {
    !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && segment.parse::<u64>().is_ok()
}

/// Split an indexed instance segment `name[index]` into its parts.
///
/// Returns `None` for a plain segment or for anything malformed.
///
/// ```
/// use watchtree_path::split_indexed;
///
/// assert_eq!(split_indexed("pop[3]"), Some(("pop", 3)));
/// assert_eq!(split_indexed("pop"), None);
/// assert_eq!(split_indexed("pop[x]"), None);
/// ```
pub fn split_indexed(segment: &str) -> Option<(&str, u64)> {
    let (name, index) = split_indexed_raw(segment)?;
    index.parse().ok().map(|i| (name, i))
}

/// Like [`split_indexed`] but keeps the index text as written, so that
/// `pop[007]` converts back to `pop/007` unchanged.
pub(crate) fn split_indexed_raw(segment: &str) -> Option<(&str, &str)> {
    let inner = segment.strip_suffix(']')?;
    let open = inner.find('[')?;
    let (name, index) = (&inner[..open], &inner[open + 1..]);
    if name.is_empty() || name.contains(']') || !is_index_literal(index) {
        return None;
    }
    Some((name, index))
}

/// Convert the flat segment at `cursor` into one instance segment.
///
/// A name followed by an index literal fuses into `name[index]` and
/// consumes two flat segments. Anything else maps one-to-one and consumes
/// one. The returned pair is `(segment, consumed)`.
///
/// # Errors
///
/// [`PathError::InvalidPath`] if `cursor` is out of range, the segment is
/// empty, or the segment is itself an index literal with no name to
/// attach to.
///
/// ```
/// use watchtree_path::to_instance_segment;
///
/// assert_eq!(to_instance_segment(&["pop", "3"], 0).unwrap(), ("pop[3]".to_string(), 2));
/// assert_eq!(to_instance_segment(&["pop", "x"], 0).unwrap(), ("pop".to_string(), 1));
/// ```
pub fn to_instance_segment<S: AsRef<str>>(
    flat: &[S],
    cursor: usize,
) -> Result<(String, usize), PathError> {
    let path = || flat.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join("/");

    let segment = flat
        .get(cursor)
        .map(|s| s.as_ref())
        .ok_or_else(|| PathError::invalid(path(), format!("cursor {cursor} out of range")))?;
    if segment.is_empty() {
        return Err(PathError::invalid(path(), format!("empty segment at {cursor}")));
    }
    if is_index_literal(segment) {
        return Err(PathError::invalid(
            path(),
            format!("index '{segment}' at {cursor} does not follow a name"),
        ));
    }

    match flat.get(cursor + 1).map(|s| s.as_ref()) {
        Some(next) if is_index_literal(next) => Ok((format!("{segment}[{next}]"), 2)),
        _ => Ok((segment.to_string(), 1)),
    }
}

/// Convert a whole run of flat segments into an instance path, fusing
/// every `name, index` pair.
///
/// # Errors
///
/// [`PathError::InvalidPath`] if `flat` is empty or any segment is
/// rejected by [`to_instance_segment`] or by instance-path validation.
pub fn fuse_segments<S: AsRef<str>>(flat: &[S]) -> Result<InstancePath, PathError> {
    let mut segments = Vec::with_capacity(flat.len());
    let mut cursor = 0;
    while cursor < flat.len() {
        let (segment, consumed) = to_instance_segment(flat, cursor)?;
        segments.push(segment);
        cursor += consumed;
    }
    InstancePath::from_segments(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuses_name_and_index() {
        assert_eq!(
            to_instance_segment(&["pop", "3"], 0).unwrap(),
            ("pop[3]".to_string(), 2)
        );
    }

    #[test]
    fn non_numeric_follower_is_not_fused() {
        assert_eq!(
            to_instance_segment(&["pop", "x"], 0).unwrap(),
            ("pop".to_string(), 1)
        );
    }

    #[test]
    fn signed_or_decimal_follower_is_not_fused() {
        assert_eq!(to_instance_segment(&["pop", "-3"], 0).unwrap().1, 1);
        assert_eq!(to_instance_segment(&["pop", "+3"], 0).unwrap().1, 1);
        assert_eq!(to_instance_segment(&["pop", "3.0"], 0).unwrap().1, 1);
    }

    #[test]
    fn last_segment_stands_alone() {
        assert_eq!(
            to_instance_segment(&["pop", "v"], 1).unwrap(),
            ("v".to_string(), 1)
        );
    }

    #[test]
    fn leading_index_is_invalid() {
        assert!(matches!(
            to_instance_segment(&["3", "v"], 0),
            Err(PathError::InvalidPath { .. })
        ));
    }

    #[test]
    fn cursor_out_of_range_is_invalid() {
        assert!(matches!(
            to_instance_segment(&["a"], 1),
            Err(PathError::InvalidPath { .. })
        ));
    }

    #[test]
    fn empty_segment_is_invalid() {
        assert!(matches!(
            to_instance_segment(&["a", ""], 1),
            Err(PathError::InvalidPath { .. })
        ));
    }

    #[test]
    fn fuse_whole_path() {
        let path = fuse_segments(&["hhpop", "0", "bioPhys1", "naChans", "na", "m", "q"]).unwrap();
        assert_eq!(path.encode(), "hhpop[0].bioPhys1.naChans.na.m.q");
    }

    #[test]
    fn fuse_consecutive_arrays() {
        let path = fuse_segments(&["net", "pop", "2", "seg", "11", "v"]).unwrap();
        assert_eq!(path.encode(), "net.pop[2].seg[11].v");
    }

    #[test]
    fn fuse_empty_is_invalid() {
        let empty: [&str; 0] = [];
        assert!(fuse_segments(&empty).is_err());
    }

    #[test]
    fn index_literal_overflow_rejected() {
        assert!(!is_index_literal("99999999999999999999999"));
    }

    #[test]
    fn split_indexed_rejects_nested_brackets() {
        assert_eq!(split_indexed("a[1][2]"), None);
        assert_eq!(split_indexed("[1]"), None);
    }
}
