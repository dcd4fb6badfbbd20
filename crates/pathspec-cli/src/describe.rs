//! # Describe Subcommand
//!
//! Prints what a manifest expects, in the documentation style test
//! runners use (`have directory "app" containing: ...`).

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use pathspec_core::load_manifest;

/// Arguments for the describe subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// YAML manifest to describe.
    #[arg(long, short)]
    pub manifest: PathBuf,
}

/// Validate the manifest and write its description to `out`.
pub fn run(args: &DescribeArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let spec = load_manifest(&args.manifest)
        .with_context(|| format!("loading {}", args.manifest.display()))?;
    spec.validate()
        .with_context(|| format!("invalid specification in {}", args.manifest.display()))?;
    writeln!(out, "{}", spec.description())?;
    Ok(())
}
