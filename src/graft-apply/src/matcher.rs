//! Exact anchor matching.
//!
//! Anchors are matched by literal byte-for-byte substring containment. There
//! is no whitespace normalization, no wildcard, and no regular-expression
//! semantics: an anchor that has drifted by a single character does not match.

/// Where an anchor block sits in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSite {
    /// The anchor does not occur in the buffer.
    Absent,
    /// The anchor occurs at least once. `offset` is the byte offset of the
    /// leftmost occurrence, `count` the total number of non-overlapping
    /// occurrences.
    Found { offset: usize, count: usize },
}

impl MatchSite {
    /// Check whether the anchor occurs exactly once.
    pub fn is_unique(&self) -> bool {
        matches!(self, Self::Found { count: 1, .. })
    }

    /// The number of occurrences (zero when absent).
    pub fn count(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Found { count, .. } => *count,
        }
    }
}

/// Locate an anchor block in a buffer.
///
/// Occurrences are counted non-overlapping, scanning left to right; the
/// offset reported is always the leftmost occurrence, which is the one
/// eligible for replacement.
pub fn locate(buffer: &str, anchor: &str) -> MatchSite {
    if anchor.is_empty() {
        return MatchSite::Absent;
    }

    let Some(first) = buffer.find(anchor) else {
        return MatchSite::Absent;
    };

    let mut count = 1;
    let mut from = first + anchor.len();
    while let Some(pos) = buffer[from..].find(anchor) {
        count += 1;
        from += pos + anchor.len();
    }

    MatchSite::Found {
        offset: first,
        count,
    }
}
