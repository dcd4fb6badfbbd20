//! # pathspec-cli: Filesystem Tree Checks from the Command Line
//!
//! Loads a YAML manifest (see [`pathspec_core::manifest`]) and evaluates
//! it against a directory tree.
//!
//! ## Subcommands
//!
//! - `check`: evaluate a manifest against a path and print the report
//! - `describe`: print the documentation-style description of a manifest
//!
//! ## Exit Codes
//!
//! | code | meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | the tree matches                          |
//! | 1    | the tree does not match                   |
//! | 2    | the manifest or specification is invalid  |
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from evaluation.
//! - Handlers write to a caller-supplied writer so they can be tested
//!   without spawning the binary.

use std::process::ExitCode;

pub mod check;
pub mod describe;

/// Outcome of a successful command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Passed => ExitCode::SUCCESS,
            Self::Failed => ExitCode::from(1),
        }
    }
}

/// Exit code for configuration and manifest errors.
pub const EXIT_INVALID: u8 = 2;
