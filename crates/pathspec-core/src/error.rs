//! # Error Types
//!
//! Two disjoint error classes run through the engine:
//!
//! - **Configuration errors** describe a malformed [`Specification`]
//!   tree. They are raised before any filesystem access and list every
//!   problem found in the tree, not just the first.
//! - **Assertion failures** are *not* errors. They are collected as
//!   [`Failure`] values and returned inside an [`Evaluation`].
//!
//! [`FetchError`] is the signal an option raises while reading an
//! attribute from disk; the engine turns it into either a skipped check
//! or a failure, never into a panic.
//!
//! [`Specification`]: crate::spec::Specification
//! [`Failure`]: crate::failure::Failure
//! [`Evaluation`]: crate::evaluate::Evaluation

use thiserror::Error;

use crate::failure::FailureReport;
use crate::spec::EntryKind;

/// A specification tree was built incorrectly.
///
/// Carries every problem found across the whole tree, in the order the
/// tree was walked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", problems.join(", "))]
pub struct ConfigurationError {
    problems: Vec<String>,
}

impl ConfigurationError {
    /// Build an error from a non-empty problem list.
    pub fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }

    /// Returns `Err` if `problems` is non-empty.
    pub fn check(problems: Vec<String>) -> Result<(), Self> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Self::new(problems))
        }
    }

    /// The individual problems, in discovery order.
    pub fn problems(&self) -> &[String] {
        &self.problems
    }
}

/// Error raised by an option while fetching the actual attribute value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The attribute cannot be read on this platform or filesystem.
    /// The check is skipped with a warning.
    #[error("not supported: {0}")]
    Unsupported(String),

    /// The attribute could not be read or parsed. Becomes a failure whose
    /// message is the contained text.
    #[error("{0}")]
    Failed(String),
}

/// Error returned by the assertion adapter ([`crate::assert_path`]).
///
/// The `Display` output is the failure message a test harness should
/// print.
#[derive(Error, Debug)]
pub enum AssertionError {
    /// The specification itself is malformed.
    #[error("invalid specification: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The entry did not satisfy the specification.
    #[error("{report}")]
    Mismatch {
        /// Grouped failures for the evaluated tree.
        report: FailureReport,
    },

    /// A negated assertion found an entry of the forbidden kind.
    #[error("expected it not to be a {kind}")]
    UnexpectedlyPresent {
        /// The kind that was found.
        kind: EntryKind,
    },
}

/// Error loading a YAML manifest into a specification tree.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest '{path}': {source}")]
    Io {
        /// Path of the manifest.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The YAML parsed but does not describe a specification tree.
    #[error("invalid manifest: {}", .0.join(", "))]
    Invalid(Vec<String>),
}
