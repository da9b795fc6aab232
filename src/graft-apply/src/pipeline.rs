//! Sequential application of substitution steps.

use crate::error::{ApplyError, ApplyResult};
use crate::matcher::MatchSite;
use crate::step::{MissPolicy, StepStatus, SubstitutionStep};
use serde::Serialize;
use tracing::{debug, warn};

/// Options for pipeline and transaction execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// If true, run the pipeline and build the report without writing the
    /// target file.
    pub dry_run: bool,
    /// If true, an anchor occurring more than once fails the transaction
    /// with [`ApplyError::AmbiguousAnchor`] instead of silently replacing
    /// the leftmost occurrence.
    pub require_unique: bool,
    /// If true, every step behaves as [`MissPolicy::Require`] regardless of
    /// its own policy.
    pub strict: bool,
}

impl ApplyOptions {
    /// Create options for dry-run mode.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }
}

/// Outcome of one step within a pipeline run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepReport {
    /// Step index in declared order (0-based).
    pub index: usize,
    /// What the step did to the buffer.
    pub status: StepStatus,
}

/// Report of a full pipeline run, one entry per step in declared order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    /// Per-step outcomes.
    pub steps: Vec<StepReport>,
    /// Number of steps that replaced their anchor.
    pub replaced: usize,
    /// Number of steps that found their replacement already in place.
    pub already_applied: usize,
    /// Number of steps whose anchor was nowhere to be found.
    pub skipped: usize,
}

impl PipelineReport {
    /// Check whether every step landed, counting already-applied steps as
    /// landed.
    pub fn all_landed(&self) -> bool {
        self.skipped == 0
    }

    /// Get a one-line summary.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} step(s): {} replaced",
            self.steps.len(),
            self.replaced
        );
        if self.already_applied > 0 {
            summary.push_str(&format!(", {} already applied", self.already_applied));
        }
        if self.skipped > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped));
        }
        summary
    }

    fn record(&mut self, index: usize, status: StepStatus) {
        match status {
            StepStatus::Replaced { .. } => self.replaced += 1,
            StepStatus::AlreadyApplied => self.already_applied += 1,
            StepStatus::Skipped => self.skipped += 1,
        }
        self.steps.push(StepReport { index, status });
    }
}

/// Run a pipeline of steps over a buffer.
///
/// Steps are folded strictly left to right: each step sees exactly the
/// buffer produced by the step before it, never any later state. There is no
/// reordering and no parallel application, because a later step's anchor may
/// only come into existence through an earlier step's replacement.
///
/// A step whose anchor is missing is a no-op unless its policy (or
/// `options.strict`) says otherwise; the fold carries on through lenient
/// misses and reports them rather than aborting.
pub fn run_pipeline(
    buffer: String,
    steps: &[SubstitutionStep],
    options: &ApplyOptions,
) -> ApplyResult<(String, PipelineReport)> {
    let mut buffer = buffer;
    let mut report = PipelineReport::default();

    for (index, step) in steps.iter().enumerate() {
        if options.require_unique {
            if let MatchSite::Found { count, .. } = step.locate(&buffer) {
                if count > 1 {
                    return Err(ApplyError::ambiguous_anchor(index, count, &step.anchor));
                }
            }
        }

        let (next, status) = step.apply(&buffer);
        match status {
            StepStatus::Replaced { offset, .. } => {
                debug!(index, offset, "anchor replaced");
            }
            StepStatus::AlreadyApplied => {
                debug!(index, "replacement already present, step skipped");
            }
            StepStatus::Skipped => {
                let required = options.strict || step.policy == MissPolicy::Require;
                if required {
                    return Err(ApplyError::anchor_missing(index, &step.anchor));
                }
                warn!(index, "anchor not found, step skipped");
            }
        }

        buffer = next.into_owned();
        report.record(index, status);
    }

    Ok((buffer, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(anchor: &str, replacement: &str) -> SubstitutionStep {
        SubstitutionStep::new(anchor, replacement)
    }

    #[test]
    fn test_replace_then_rerun_is_noop() {
        let steps = vec![step("B", "B2")];
        let (out, report) =
            run_pipeline("A\nB\nC".to_string(), &steps, &ApplyOptions::default()).unwrap();
        assert_eq!(out, "A\nB2\nC");
        assert_eq!(report.replaced, 1);

        // Re-running against the output is a no-op.
        let (again, report) = run_pipeline(out.clone(), &steps, &ApplyOptions::default()).unwrap();
        assert_eq!(again, out);
        assert_eq!(report.replaced, 0);
        assert_eq!(report.already_applied, 1);
    }

    #[test]
    fn test_order_sensitivity() {
        // Step B's anchor only exists once step A's replacement has landed.
        let a = step("use std::fs;", "use std::fs;\nuse std::io;");
        let b = step("use std::io;", "use std::io::{self, Write};");
        let input = "use std::fs;\n".to_string();

        let (out, report) = run_pipeline(
            input.clone(),
            &[a.clone(), b.clone()],
            &ApplyOptions::default(),
        )
        .unwrap();
        assert_eq!(out, "use std::fs;\nuse std::io::{self, Write};\n");
        assert_eq!(report.replaced, 2);

        let (out, report) = run_pipeline(input, &[b, a], &ApplyOptions::default()).unwrap();
        assert_eq!(out, "use std::fs;\nuse std::io;\n");
        assert_eq!(report.replaced, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_non_interference() {
        let steps = vec![step("never present", "x"), step("B", "B2")];
        let (out, report) =
            run_pipeline("A\nB\nC".to_string(), &steps, &ApplyOptions::default()).unwrap();
        assert_eq!(out, "A\nB2\nC");
        assert_eq!(report.skipped, 1);
        assert!(!report.all_landed());
    }

    #[test]
    fn test_leftmost_match() {
        let steps = vec![step("dup", "DUP")];
        let (out, _) =
            run_pipeline("dup one dup two".to_string(), &steps, &ApplyOptions::default()).unwrap();
        assert_eq!(out, "DUP one dup two");
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let (out, report) =
            run_pipeline("unchanged".to_string(), &[], &ApplyOptions::default()).unwrap();
        assert_eq!(out, "unchanged");
        assert!(report.steps.is_empty());
        assert!(report.all_landed());
    }

    #[test]
    fn test_idempotence_over_whole_pipeline() {
        let steps = vec![
            step("A", "A1"),
            step("B", "B1"),
            step("never", "x"),
        ];
        let once = run_pipeline("A\nB".to_string(), &steps, &ApplyOptions::default())
            .unwrap()
            .0;
        let twice = run_pipeline(once.clone(), &steps, &ApplyOptions::default())
            .unwrap()
            .0;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_required_step_miss_fails() {
        let steps = vec![SubstitutionStep::required("missing", "x")];
        let err = run_pipeline("A".to_string(), &steps, &ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, ApplyError::AnchorMissing { index: 0, .. }));
    }

    #[test]
    fn test_strict_overrides_lenient_steps() {
        let steps = vec![step("missing", "x")];
        let options = ApplyOptions {
            strict: true,
            ..Default::default()
        };
        let err = run_pipeline("A".to_string(), &steps, &options).unwrap_err();
        assert!(matches!(err, ApplyError::AnchorMissing { .. }));
    }

    #[test]
    fn test_require_unique_rejects_ambiguous_anchor() {
        let steps = vec![step("dup", "DUP")];
        let options = ApplyOptions {
            require_unique: true,
            ..Default::default()
        };
        let err = run_pipeline("dup dup".to_string(), &steps, &options).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::AmbiguousAnchor { index: 0, count: 2, .. }
        ));
    }

    #[test]
    fn test_report_summary() {
        let steps = vec![step("A", "A1"), step("gone", "x")];
        let (_, report) =
            run_pipeline("A".to_string(), &steps, &ApplyOptions::default()).unwrap();
        let summary = report.summary();
        assert!(summary.contains("2 step(s)"));
        assert!(summary.contains("1 replaced"));
        assert!(summary.contains("1 skipped"));
    }
}
