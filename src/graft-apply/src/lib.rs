//! Graft - literal block substitution for source files.
//!
//! This crate injects a cohesive set of edits into an existing text file by
//! applying an ordered list of (anchor, replacement) literal substitutions:
//! - Exact multi-line anchor matching, leftmost occurrence replaced
//! - Strict left-to-right application so later anchors can depend on text
//!   introduced by earlier replacements
//! - Lenient misses by default, keeping pipelines idempotent across re-runs
//! - Opt-in strictness: required steps and anchor uniqueness checks
//! - Per-step outcome reporting and dry-run mode
//!
//! # Example
//!
//! ```no_run
//! use graft_apply::{ApplyOptions, SubstitutionStep, execute};
//! use std::path::Path;
//!
//! let steps = vec![
//!     SubstitutionStep::new("import { A } from \"pkg\"", "import { A, B } from \"pkg\""),
//!     SubstitutionStep::new("render(<A />)", "render(<><A /><B /></>)"),
//! ];
//!
//! let report = execute(Path::new("src/page.tsx"), &steps, &ApplyOptions::default());
//! ```

mod error;
mod matcher;
mod parser;
mod pipeline;
mod step;
mod transaction;

pub use error::{ApplyError, ApplyResult};
pub use matcher::{MatchSite, locate};
pub use parser::parse_patchset;
pub use pipeline::{ApplyOptions, PipelineReport, StepReport, run_pipeline};
pub use step::{MissPolicy, StepStatus, SubstitutionStep};
pub use transaction::{TransactionReport, execute};

use std::path::Path;

/// Parse a textual patchset and apply it to the file at `path`.
///
/// This is the main entry point for callers holding a patchset as text
/// rather than as constructed steps.
pub fn parse_and_apply(
    patchset: &str,
    path: &Path,
    options: &ApplyOptions,
) -> ApplyResult<TransactionReport> {
    let steps = parse_patchset(patchset)?;
    execute(path, &steps, options)
}

/// Report what a patchset would do to the file at `path` without writing.
pub fn dry_run(patchset: &str, path: &Path) -> ApplyResult<TransactionReport> {
    parse_and_apply(patchset, path, &ApplyOptions::dry_run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PATCHSET: &str = "<<<<<<< SEARCH\nB\n=======\nB2\n>>>>>>> REPLACE\n";

    #[test]
    fn test_parse_and_apply_simple() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        fs::write(&path, "A\nB\nC").unwrap();

        let report = parse_and_apply(PATCHSET, &path, &ApplyOptions::default()).unwrap();

        assert!(report.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "A\nB2\nC");
    }

    #[test]
    fn test_dry_run_no_changes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        fs::write(&path, "A\nB\nC").unwrap();

        let report = dry_run(PATCHSET, &path).unwrap();

        assert!(report.dry_run);
        assert!(report.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "A\nB\nC");
    }

    #[test]
    fn test_empty_patchset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        fs::write(&path, "content").unwrap();

        let report = parse_and_apply("", &path, &ApplyOptions::default()).unwrap();

        assert!(!report.changed);
        assert!(report.pipeline.steps.is_empty());
    }

    #[test]
    fn test_parse_error_aborts_before_read() {
        let temp = TempDir::new().unwrap();
        // File intentionally absent: the parse error must surface first.
        let path = temp.path().join("absent.txt");

        let err = parse_and_apply("stray text\n", &path, &ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, ApplyError::ParseError { .. }));
    }
}
