//! Textual patchset parsing.
//!
//! A patchset file is a sequence of search/replace blocks in declared order:
//!
//! ```text
//! <<<<<<< SEARCH
//! old content
//! =======
//! new content
//! >>>>>>> REPLACE
//! ```
//!
//! `<<<<<<< SEARCH!` marks the block as required: a missing anchor then fails
//! the whole transaction instead of being skipped. Blank lines and `#`
//! comment lines are allowed between blocks.

use crate::error::{ApplyError, ApplyResult};
use crate::step::{MissPolicy, SubstitutionStep};

const SEARCH_MARKER: &str = "<<<<<<< SEARCH";
const DIVIDER_MARKER: &str = "=======";
const REPLACE_MARKER: &str = ">>>>>>> REPLACE";

/// Parse a patchset into substitution steps, preserving declared order.
pub fn parse_patchset(input: &str) -> ApplyResult<Vec<SubstitutionStep>> {
    let lines: Vec<&str> = input.lines().collect();
    let mut steps = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let line_number = i + 1;

        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            i += 1;
            continue;
        }

        let policy = match line {
            SEARCH_MARKER => MissPolicy::Skip,
            l if l == format!("{SEARCH_MARKER}!") => MissPolicy::Require,
            DIVIDER_MARKER => {
                return Err(ApplyError::parse("divider outside a block", line_number));
            }
            REPLACE_MARKER => {
                return Err(ApplyError::parse(
                    "replace marker outside a block",
                    line_number,
                ));
            }
            other => {
                return Err(ApplyError::parse(
                    format!("unexpected content outside a block: {other}"),
                    line_number,
                ));
            }
        };

        let (step, consumed) = parse_block(&lines[i + 1..], line_number, policy)?;
        steps.push(step);
        i += consumed + 1;
    }

    Ok(steps)
}

/// Parse one block body, starting just past its SEARCH marker. Returns the
/// step and the number of lines consumed (through the REPLACE marker).
fn parse_block(
    lines: &[&str],
    opened_at: usize,
    policy: MissPolicy,
) -> ApplyResult<(SubstitutionStep, usize)> {
    let mut anchor_lines: Vec<&str> = Vec::new();
    let mut replacement_lines: Vec<&str> = Vec::new();
    let mut in_replacement = false;

    for (offset, line) in lines.iter().enumerate() {
        let line_number = opened_at + 1 + offset;
        match *line {
            DIVIDER_MARKER => {
                if in_replacement {
                    return Err(ApplyError::parse("duplicate divider in block", line_number));
                }
                in_replacement = true;
            }
            REPLACE_MARKER => {
                if !in_replacement {
                    return Err(ApplyError::parse(
                        "replace marker before divider",
                        line_number,
                    ));
                }
                let step = SubstitutionStep {
                    anchor: anchor_lines.join("\n"),
                    replacement: replacement_lines.join("\n"),
                    policy,
                };
                return Ok((step, offset + 1));
            }
            content if content == SEARCH_MARKER || content == format!("{SEARCH_MARKER}!") => {
                return Err(ApplyError::parse(
                    "new block opened before the previous one closed",
                    line_number,
                ));
            }
            content => {
                if in_replacement {
                    replacement_lines.push(content);
                } else {
                    anchor_lines.push(content);
                }
            }
        }
    }

    Err(ApplyError::parse("unterminated block", opened_at))
}
