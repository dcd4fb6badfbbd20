//! # pathspec CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pathspec_cli::{check, describe, Status, EXIT_INVALID};

/// Declarative filesystem tree checks.
///
/// Evaluates a YAML manifest against a directory and reports every
/// entry that is not as expected.
#[derive(Parser, Debug)]
#[command(name = "pathspec", version, about)]
struct Cli {
    /// Log evaluation details at debug level when `RUST_LOG` is unset.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check a path against a manifest.
    Check(check::CheckArgs),
    /// Print the description of a manifest.
    Describe(describe::DescribeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Check(args) => check::run(args, &mut stdout),
        Commands::Describe(args) => describe::run(args, &mut stdout).map(|()| Status::Passed),
    };

    match result {
        Ok(status) => status.exit_code(),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_INVALID)
        }
    }
}
