//! Whole-file transaction: read, run the pipeline, write back.

use crate::error::{ApplyError, ApplyResult};
use crate::pipeline::{ApplyOptions, PipelineReport, run_pipeline};
use crate::step::SubstitutionStep;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Report of a completed file transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionReport {
    /// The target file path.
    pub path: String,
    /// Whether this was a dry run (nothing written).
    pub dry_run: bool,
    /// Whether the final buffer differed from the original content.
    pub changed: bool,
    /// Per-step outcomes.
    pub pipeline: PipelineReport,
}

impl TransactionReport {
    /// Get a one-line summary.
    pub fn summary(&self) -> String {
        let action = match (self.dry_run, self.changed) {
            (true, true) => "Would update",
            (true, false) => "Would leave unchanged",
            (false, true) => "Updated",
            (false, false) => "Left unchanged",
        };
        format!("{} {} ({})", action, self.path, self.pipeline.summary())
    }
}

/// Execute a substitution pipeline against a single file.
///
/// The file is read once into an in-memory buffer, the pipeline is folded
/// over it, and the final buffer is written back in a single whole-file
/// overwrite. Read and write failures are fatal; a read failure leaves the
/// file untouched, and a write failure loses only the in-memory result, never
/// part of it. There is no locking and no detection of concurrent external
/// edits between the read and the write.
///
/// A completed transaction counts as successful even when no anchor matched;
/// the report's per-step outcomes are the audit trail.
pub fn execute(
    path: &Path,
    steps: &[SubstitutionStep],
    options: &ApplyOptions,
) -> ApplyResult<TransactionReport> {
    if !path.exists() {
        return Err(ApplyError::file_not_found(path));
    }

    let original = fs::read_to_string(path).map_err(|e| ApplyError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (buffer, pipeline) = run_pipeline(original.clone(), steps, options)?;
    let changed = buffer != original;

    if options.dry_run {
        debug!(path = %path.display(), changed, "dry run, skipping write");
    } else {
        fs::write(path, &buffer).map_err(|e| ApplyError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(TransactionReport {
        path: path.display().to_string(),
        dry_run: options.dry_run,
        changed,
        pipeline,
    })
}
