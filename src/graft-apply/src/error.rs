//! Error types for substitution operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for substitution operations.
pub type ApplyResult<T> = Result<T, ApplyError>;

/// Errors that can occur while parsing a patchset or applying it to a file.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Target file does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the target file.
    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the target file back.
    #[error("Failed to write file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required anchor block was not found in the buffer.
    #[error("Anchor for step {index} not found: {anchor}")]
    AnchorMissing { index: usize, anchor: String },

    /// An anchor block matched more than once while uniqueness was required.
    #[error("Anchor for step {index} matched {count} times, expected exactly one: {anchor}")]
    AmbiguousAnchor {
        index: usize,
        count: usize,
        anchor: String,
    },

    /// Failed to parse a textual patchset.
    #[error("Failed to parse patchset at line {line_number}: {message}")]
    ParseError { message: String, line_number: usize },
}

/// Maximum length of an anchor excerpt embedded in an error message.
const PREVIEW_LEN: usize = 60;

/// Shorten an anchor block to a single-line excerpt suitable for an error
/// message.
pub(crate) fn preview(block: &str) -> String {
    let flat = block.replace('\n', "\\n");
    let mut out: String = flat.chars().take(PREVIEW_LEN).collect();
    if flat.chars().count() > PREVIEW_LEN {
        out.push_str("...");
    }
    out
}

impl ApplyError {
    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an anchor missing error for the step at `index`.
    pub fn anchor_missing(index: usize, anchor: &str) -> Self {
        Self::AnchorMissing {
            index,
            anchor: preview(anchor),
        }
    }

    /// Create an ambiguous anchor error for the step at `index`.
    pub fn ambiguous_anchor(index: usize, count: usize, anchor: &str) -> Self {
        Self::AmbiguousAnchor {
            index,
            count,
            anchor: preview(anchor),
        }
    }

    /// Create a parse error at the given 1-indexed line.
    pub fn parse(message: impl Into<String>, line_number: usize) -> Self {
        Self::ParseError {
            message: message.into(),
            line_number,
        }
    }
}
