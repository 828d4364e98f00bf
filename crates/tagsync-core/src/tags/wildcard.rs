//! Restricted `*` glob used for bulk retractions such as `-pose_*`.
//!
//! Each literal segment is matched at its leftmost position after the
//! previous one, without backtracking. Patterns that need a later alignment
//! to succeed do not match. That includes suffix patterns whose segment also
//! occurs earlier in the candidate: `*s` misses `glasses` because the first
//! `s` is not at the end. Only a trailing `*` (prefix retraction such as
//! `pose_*`) is free of this.

/// Returns true when `candidate` matches `pattern`.
///
/// A pattern without a leading `*` is anchored at the start of the
/// candidate, and one without a trailing `*` must end exactly at its end.
/// Empty segments from repeated stars are ignored.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    let anchored_start = !pattern.starts_with('*');
    let anchored_end = !pattern.ends_with('*');

    let mut pos = 0;
    for (index, segment) in pattern
        .split('*')
        .filter(|segment| !segment.is_empty())
        .enumerate()
    {
        let found = if index == 0 && anchored_start {
            candidate.starts_with(segment).then_some(0)
        } else {
            candidate[pos..].find(segment).map(|offset| offset + pos)
        };
        match found {
            Some(start) => pos = start + segment.len(),
            None => return false,
        }
    }

    !anchored_end || pos == candidate.len()
}
