//! # Check Subcommand
//!
//! `pathspec check --manifest tree.yml [PATH] [--format text|json]`

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::Serialize;

use pathspec_core::{
    load_manifest, Evaluation, Failure, FailureGroup, FailureReport, SkippedCheck,
};

use crate::Status;

/// Report format for `check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML manifest describing the expected tree.
    #[arg(long, short)]
    pub manifest: PathBuf,

    /// Base path the manifest is evaluated against.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Machine-readable form of one evaluation.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    path: String,
    ok: bool,
    failures: &'a [Failure],
    groups: Vec<FailureGroup>,
    skipped: &'a [SkippedCheck],
}

impl<'a> JsonReport<'a> {
    fn new(evaluation: &'a Evaluation, report: &FailureReport) -> Self {
        Self {
            path: evaluation.path().display().to_string(),
            ok: report.is_empty(),
            failures: evaluation.failures(),
            groups: report.groups().to_vec(),
            skipped: evaluation.skipped(),
        }
    }
}

/// Evaluate the manifest and write the report to `out`.
///
/// # Errors
///
/// Fails if the manifest cannot be loaded, the tree it describes is
/// invalid, or `out` cannot be written.
pub fn run(args: &CheckArgs, out: &mut impl Write) -> anyhow::Result<Status> {
    let spec = load_manifest(&args.manifest)
        .with_context(|| format!("loading {}", args.manifest.display()))?;
    let evaluation = spec
        .evaluate(&args.path)
        .with_context(|| format!("invalid specification in {}", args.manifest.display()))?;

    tracing::info!(
        path = %evaluation.path().display(),
        failures = evaluation.failures().len(),
        skipped = evaluation.skipped().len(),
        "check finished"
    );

    let report = evaluation.report();
    match args.format {
        OutputFormat::Text if report.is_empty() => {
            writeln!(out, "{} is as expected", evaluation.path().display())?;
        }
        OutputFormat::Text => writeln!(out, "{report}")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &JsonReport::new(&evaluation, &report))?;
            writeln!(out)?;
        }
    }

    Ok(if report.is_empty() {
        Status::Passed
    } else {
        Status::Failed
    })
}
