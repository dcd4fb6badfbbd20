//! Test-harness adapter.
//!
//! Wraps evaluation in the `Result` shape a test wants: `Ok(())` on
//! success, or an [`AssertionError`] whose `Display` is the message to
//! print. Configuration problems surface as their own variant so a
//! broken specification is never mistaken for a failing tree.

use std::path::Path;

use crate::error::AssertionError;
use crate::spec::Specification;

/// Assert that the entry described by `spec` under `base` matches it.
///
/// ```no_run
/// use pathspec_core::{assert_path, be_dir, file};
///
/// assert_path(&be_dir().containing([file("Cargo.toml")]), ".")?;
/// # Ok::<(), pathspec_core::AssertionError>(())
/// ```
pub fn assert_path(spec: &Specification, base: impl AsRef<Path>) -> Result<(), AssertionError> {
    let evaluation = spec.evaluate(base)?;
    if evaluation.is_ok() {
        Ok(())
    } else {
        Err(AssertionError::Mismatch {
            report: evaluation.report(),
        })
    }
}

/// Assert that no entry of `spec`'s kind exists where `spec` points.
pub fn assert_no_path(spec: &Specification, base: impl AsRef<Path>) -> Result<(), AssertionError> {
    let base = base.as_ref();
    if spec.evaluate_negated(base)? {
        return Ok(());
    }
    tracing::debug!(path = %spec.resolve_path(base).display(), "entry unexpectedly present");
    Err(AssertionError::UnexpectedlyPresent { kind: spec.kind() })
}
