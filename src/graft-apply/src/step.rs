//! Substitution step data structures.

use crate::matcher::{self, MatchSite};
use serde::Serialize;
use std::borrow::Cow;

/// What a step should do when its anchor is not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissPolicy {
    /// Leave the buffer untouched and carry on. This is what makes a
    /// pipeline idempotent: re-running it against an already-patched file
    /// turns every applied step into a no-op.
    #[default]
    Skip,
    /// Fail the whole transaction. Use for steps where a silent miss would
    /// mask a drifted anchor.
    Require,
}

/// One literal substitution: an anchor block paired with the replacement
/// block that supersedes it.
///
/// Steps are immutable once constructed and hold no state between
/// applications. Ordering within a pipeline is semantically significant:
/// a later step's anchor may only exist because an earlier step's
/// replacement introduced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionStep {
    /// Text expected to exist verbatim in the buffer.
    pub anchor: String,
    /// Text that replaces the first occurrence of the anchor.
    pub replacement: String,
    /// Miss handling for this step.
    pub policy: MissPolicy,
}

/// Outcome of applying a single step to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepStatus {
    /// The leftmost occurrence of the anchor was replaced. `occurrences` is
    /// the number of times the anchor was present before replacement.
    Replaced { offset: usize, occurrences: usize },
    /// The step had landed on a previous run: either the anchor is gone and
    /// the replacement text is present, or the leftmost match site already
    /// carries the replacement.
    AlreadyApplied,
    /// The anchor was absent and the replacement is nowhere to be seen.
    /// Either the step was never meant for this file or the anchor drifted.
    Skipped,
}

impl StepStatus {
    /// Check whether this step changed the buffer.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

impl SubstitutionStep {
    /// Create a step with the default lenient miss policy.
    pub fn new(anchor: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            replacement: replacement.into(),
            policy: MissPolicy::Skip,
        }
    }

    /// Create a step that fails the transaction when its anchor is missing.
    pub fn required(anchor: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            policy: MissPolicy::Require,
            ..Self::new(anchor, replacement)
        }
    }

    /// Locate this step's anchor in a buffer.
    pub fn locate(&self, buffer: &str) -> MatchSite {
        matcher::locate(buffer, &self.anchor)
    }

    /// Apply this step to a buffer, replacing the first occurrence of the
    /// anchor. The buffer is borrowed back unchanged when the anchor is
    /// absent or the step has already landed.
    ///
    /// A step whose replacement retains its own anchor (a common shape when
    /// a block is extended in place) would re-fire on every run: the anchor
    /// still matches inside the landed replacement. Such a match site is
    /// reported `AlreadyApplied` and left alone. The check requires the
    /// surrounding text to read exactly as the replacement at the position
    /// the anchor occupies within it, so a first-run anchor is never
    /// mistaken for a landed one.
    ///
    /// Policy enforcement (miss handling, uniqueness) is the pipeline's
    /// concern; applying a step never fails.
    pub fn apply<'a>(&self, buffer: &'a str) -> (Cow<'a, str>, StepStatus) {
        match self.locate(buffer) {
            MatchSite::Found { offset, count } => {
                if self.site_already_replaced(buffer, offset) {
                    return (Cow::Borrowed(buffer), StepStatus::AlreadyApplied);
                }
                let mut out = String::with_capacity(
                    buffer.len() - self.anchor.len() + self.replacement.len(),
                );
                out.push_str(&buffer[..offset]);
                out.push_str(&self.replacement);
                out.push_str(&buffer[offset + self.anchor.len()..]);
                (
                    Cow::Owned(out),
                    StepStatus::Replaced {
                        offset,
                        occurrences: count,
                    },
                )
            }
            MatchSite::Absent => {
                let status = if !self.replacement.is_empty() && buffer.contains(&self.replacement) {
                    StepStatus::AlreadyApplied
                } else {
                    StepStatus::Skipped
                };
                (Cow::Borrowed(buffer), status)
            }
        }
    }

    /// Check whether the anchor occurrence at `offset` sits inside an
    /// already-landed occurrence of the replacement.
    ///
    /// Only possible when the replacement contains the anchor: the landed
    /// replacement would then start `k` bytes before the match site, where
    /// `k` is the anchor's position within the replacement.
    fn site_already_replaced(&self, buffer: &str, offset: usize) -> bool {
        let Some(k) = self.replacement.find(self.anchor.as_str()) else {
            return false;
        };
        // `offset - k` may fall mid-character in multi-byte text; such a
        // position cannot hold a landed replacement.
        offset >= k
            && buffer
                .get(offset - k..)
                .is_some_and(|tail| tail.starts_with(self.replacement.as_str()))
    }
}
