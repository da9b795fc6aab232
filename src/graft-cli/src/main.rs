//! Graft CLI - Main entry point.
//!
//! Applies a patchset of literal search/replace blocks to a single target
//! file. The engine lives in `graft-apply`; this binary only handles
//! argument parsing, logging setup, and status reporting.

use anyhow::{Context, Result};
use clap::Parser;
use graft_apply::{ApplyOptions, StepStatus, TransactionReport, parse_and_apply};
use std::fs;
use std::path::PathBuf;

/// Apply literal block substitutions to a file.
#[derive(Debug, Parser)]
#[command(name = "graft", version, about)]
struct Cli {
    /// The target file to transform in place.
    target: PathBuf,

    /// Patchset file of search/replace blocks, applied in declared order.
    #[arg(short, long)]
    patchset: PathBuf,

    /// Run the pipeline and report without writing the target file.
    #[arg(long)]
    dry_run: bool,

    /// Treat every step as required: any missing anchor fails the run.
    #[arg(long)]
    strict: bool,

    /// Fail when an anchor occurs more than once instead of replacing the
    /// leftmost occurrence.
    #[arg(long)]
    require_unique: bool,

    /// Emit the transaction report as JSON instead of the status banner.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (RUST_LOG overrides this).
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn describe(status: &StepStatus) -> String {
    match status {
        StepStatus::Replaced { offset, occurrences } if *occurrences > 1 => {
            format!("replaced at byte {offset} ({occurrences} occurrences, leftmost taken)")
        }
        StepStatus::Replaced { offset, .. } => format!("replaced at byte {offset}"),
        StepStatus::AlreadyApplied => "already applied".to_string(),
        StepStatus::Skipped => "skipped (anchor not found)".to_string(),
    }
}

fn print_report(report: &TransactionReport) {
    println!("{}", report.summary());
    for step in &report.pipeline.steps {
        println!("  step {}: {}", step.index, describe(&step.status));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let patchset = fs::read_to_string(&cli.patchset).with_context(|| {
        format!("failed to read patchset {}", cli.patchset.display())
    })?;

    let options = ApplyOptions {
        dry_run: cli.dry_run,
        strict: cli.strict,
        require_unique: cli.require_unique,
    };

    let report = parse_and_apply(&patchset, &cli.target, &options)
        .with_context(|| format!("failed to apply patchset to {}", cli.target.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from([
            "graft",
            "src/page.tsx",
            "--patchset",
            "feature.patchset",
            "--dry-run",
            "--strict",
        ])
        .unwrap();
        assert_eq!(cli.target, PathBuf::from("src/page.tsx"));
        assert!(cli.dry_run);
        assert!(cli.strict);
        assert!(!cli.require_unique);
    }

    #[test]
    fn test_describe_statuses() {
        let replaced = StepStatus::Replaced {
            offset: 12,
            occurrences: 1,
        };
        assert_eq!(describe(&replaced), "replaced at byte 12");

        let ambiguous = StepStatus::Replaced {
            offset: 0,
            occurrences: 3,
        };
        assert!(describe(&ambiguous).contains("leftmost taken"));

        assert!(describe(&StepStatus::Skipped).contains("not found"));
    }
}
