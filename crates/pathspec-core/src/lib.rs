//! # pathspec-core: Declarative Filesystem Assertions
//!
//! Build a tree of [`Specification`]s describing what a filesystem entry
//! (and, recursively, a directory's contents) must look like, then
//! evaluate it once against a base path to get either success or a list
//! of path-attributed [`Failure`]s.
//!
//! ```no_run
//! use pathspec_core::{be_dir, dir, file, no_file, predicate, Child};
//!
//! let release = be_dir().containing_exactly([
//!     Child::from(file("VERSION").content(predicate::contains("1."))),
//!     Child::from(dir("bin").mode("0755")),
//!     Child::from(no_file("debug.log")),
//! ]);
//!
//! let evaluation = release.evaluate("/opt/app/current")?;
//! if !evaluation.is_ok() {
//!     eprintln!("{}", evaluation.report());
//! }
//! # Ok::<(), pathspec_core::ConfigurationError>(())
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Validate, then evaluate.** The whole tree is checked for
//!    construction mistakes before the filesystem is touched, and every
//!    problem is reported together in a [`ConfigurationError`].
//!
//! 2. **Failures are data.** A mismatch never aborts evaluation; each
//!    unmet expectation becomes a [`Failure`] attributed to a path
//!    relative to the evaluated entry.
//!
//! 3. **One option protocol.** Every attribute check (size, mode, owner,
//!    content, ...) is an [`OptionDefinition`] with the same validate,
//!    fetch, compare steps. Literals and [`Predicate`]s are interchangeable
//!    wherever an expected value is accepted.
//!
//! 4. **Immutable specifications.** Evaluation state is local to each
//!    run, so a tree can be reused, nested under several parents, and
//!    evaluated from several threads.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Platform-specific attributes (birth time, ownership) degrade to a
//!   skipped check with a warning, never to an error.

pub mod assertion;
pub mod error;
pub mod evaluate;
pub mod failure;
pub mod fs;
pub mod manifest;
pub mod option;
pub mod predicate;
pub mod spec;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use assertion::{assert_no_path, assert_path};
pub use error::{AssertionError, ConfigurationError, FetchError, ManifestError};
pub use evaluate::{Evaluation, SkippedCheck};
pub use failure::{Failure, FailureGroup, FailureReport};
pub use manifest::{load_manifest, parse_manifest};
pub use option::{OptionDefinition, OptionKey};
pub use predicate::{Expected, Predicate};
pub use spec::{
    be_dir, be_file, be_symlink, dir, file, no_dir, no_file, no_symlink, symlink, Child,
    Containment, ContainmentMode, EntryKind, NegativeEntry, Specification,
};
pub use value::{Value, ValueKind};
