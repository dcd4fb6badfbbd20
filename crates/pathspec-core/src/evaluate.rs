//! # Evaluation Engine
//!
//! Turns a [`Specification`] and a base path into an [`Evaluation`].
//! Evaluation always runs in two phases:
//!
//! 1. **Structural validation** of the whole tree. Any problem aborts
//!    with a [`ConfigurationError`] before the filesystem is touched.
//! 2. **Dynamic evaluation** against live filesystem state:
//!    - resolve the entry's path (the base itself for unnamed entries);
//!    - check the entry exists with the declared kind, stopping at the
//!      first mismatch for this entry only;
//!    - run every option constraint independently;
//!    - for directories, evaluate the containment clause.
//!
//! ## Containment
//!
//! Declared children are evaluated in order against the directory's path
//! and their failures are re-attributed under the child's name. Negative
//! entries fail under their own name when an entry of that kind exists.
//! In exact mode, undeclared entries are reported only when every
//! declared child passed, as one failure on the directory itself listing
//! the unexpected names sorted.
//!
//! All per-run state lives in a private evaluator, never on the
//! specification, so the same tree can be evaluated repeatedly or from
//! several threads at once.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ConfigurationError;
use crate::failure::{Failure, FailureReport};
use crate::fs;
use crate::option::{self, CheckOutcome, OptionKey};
use crate::spec::{Child, Containment, ContainmentMode, EntryKind, Specification};

/// An option check that was skipped because the platform cannot
/// provide the attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCheck {
    pub path: PathBuf,
    pub key: &'static str,
    pub reason: String,
}

/// Outcome of evaluating a specification tree.
#[derive(Debug, Clone)]
pub struct Evaluation {
    path: PathBuf,
    failures: Vec<Failure>,
    skipped: Vec<SkippedCheck>,
}

impl Evaluation {
    /// Resolved path of the evaluated root entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when no expectation failed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures in discovery order.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn skipped(&self) -> &[SkippedCheck] {
        &self.skipped
    }

    pub fn report(&self) -> FailureReport {
        FailureReport::new(&self.path, &self.failures)
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

impl Specification {
    /// Path this specification refers to under `base`.
    pub fn resolve_path(&self, base: &Path) -> PathBuf {
        if self.is_self() {
            base.to_path_buf()
        } else {
            base.join(self.name())
        }
    }

    /// Validate the tree, then evaluate it against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] listing every construction problem
    /// in the tree. Assertion failures are not errors; they are returned
    /// in the [`Evaluation`].
    pub fn evaluate(&self, base: impl AsRef<Path>) -> Result<Evaluation, ConfigurationError> {
        self.validate()?;

        let base = base.as_ref();
        let path = self.resolve_path(base);
        tracing::debug!(path = %path.display(), spec = %self.description(), "evaluating");

        let mut evaluator = Evaluator::default();
        let failures = evaluator.entry(self, base);

        tracing::debug!(
            path = %path.display(),
            failures = failures.len(),
            skipped = evaluator.skipped.len(),
            "evaluation finished"
        );
        Ok(Evaluation {
            path,
            failures,
            skipped: evaluator.skipped,
        })
    }

    /// Negated check: succeeds when no entry of this kind is at the path.
    ///
    /// Returns `Ok(true)` when the assertion holds.
    ///
    /// # Errors
    ///
    /// A negated expectation cannot carry options or a containment
    /// clause; either is reported as a [`ConfigurationError`].
    pub fn evaluate_negated(&self, base: impl AsRef<Path>) -> Result<bool, ConfigurationError> {
        ConfigurationError::check(self.negation_problems())?;
        let path = self.resolve_path(base.as_ref());
        Ok(!fs::is_kind(&path, self.kind()))
    }
}

#[derive(Default)]
struct Evaluator {
    warned: HashSet<OptionKey>,
    skipped: Vec<SkippedCheck>,
}

impl Evaluator {
    /// Failures for `spec` under `base`, attributed relative to the entry.
    fn entry(&mut self, spec: &Specification, base: &Path) -> Vec<Failure> {
        let path = spec.resolve_path(base);

        if !fs::is_kind(&path, spec.kind()) {
            let message = if fs::exists(&path) {
                spec.kind().wrong_kind_message()
            } else {
                "expected it to exist"
            };
            return vec![Failure::at_self(message)];
        }

        let mut failures = Vec::new();
        let follow_links = spec.kind() != EntryKind::Symlink;
        for (key, expected) in spec.constraints() {
            match option::check(key, &path, follow_links, expected) {
                CheckOutcome::Passed => {}
                CheckOutcome::Failed(message) => failures.push(Failure::at_self(message)),
                CheckOutcome::Skipped(reason) => self.skip(key, &path, reason),
            }
        }

        if spec.kind().is_container() {
            if let Some(containment) = spec.containment() {
                self.contents(containment, &path, &mut failures);
            }
        }
        failures
    }

    fn contents(&mut self, containment: &Containment, dir: &Path, failures: &mut Vec<Failure>) {
        let before = failures.len();

        for child in containment.children() {
            match child {
                Child::Entry(spec) => {
                    let nested = self.entry(spec, dir);
                    failures.extend(nested.into_iter().map(|f| f.nested_under(spec.name())));
                }
                Child::Absent(neg) => {
                    if fs::is_kind(&dir.join(neg.name()), neg.kind()) {
                        failures.push(Failure::new(
                            neg.name(),
                            format!("expected {} not to be found, but it exists", neg.kind()),
                        ));
                    }
                }
            }
        }

        if containment.mode() == ContainmentMode::Exact && failures.len() == before {
            if let Some(failure) = unexpected_entries(containment, dir) {
                failures.push(failure);
            }
        }
    }

    fn skip(&mut self, key: OptionKey, path: &Path, reason: String) {
        if self.warned.insert(key) {
            tracing::warn!(
                option = %key,
                path = %path.display(),
                reason = %reason,
                "{key} expectations are not supported here and will be skipped"
            );
        }
        self.skipped.push(SkippedCheck {
            path: path.to_path_buf(),
            key: key.as_str(),
            reason,
        });
    }
}

/// The exact-mode failure for `dir`, if it holds undeclared entries.
fn unexpected_entries(containment: &Containment, dir: &Path) -> Option<Failure> {
    let declared: HashSet<&str> = containment
        .children()
        .iter()
        .filter_map(|child| match child {
            Child::Entry(spec) => Some(spec.name()),
            Child::Absent(_) => None,
        })
        .collect();

    let actual = match fs::child_names(dir) {
        Ok(names) => names,
        Err(e) => {
            return Some(Failure::at_self(format!(
                "expected to list its entries, but got error: {e}"
            )))
        }
    };

    let unexpected: BTreeSet<String> = actual
        .into_iter()
        .filter(|name| !declared.contains(name.as_str()))
        .collect();
    if unexpected.is_empty() {
        return None;
    }

    let names: Vec<String> = unexpected.into_iter().collect();
    Some(Failure::at_self(format!(
        "expected no other entries, but found {names:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{be_dir, be_file, dir, file, no_dir, no_file, symlink};
    use std::fs as stdfs;

    fn tree(entries: &[&str]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for entry in entries {
            if let Some(dir) = entry.strip_suffix('/') {
                stdfs::create_dir_all(tmp.path().join(dir)).unwrap();
            } else {
                let path = tmp.path().join(entry);
                if let Some(parent) = path.parent() {
                    stdfs::create_dir_all(parent).unwrap();
                }
                stdfs::write(&path, "content").unwrap();
            }
        }
        tmp
    }

    #[test]
    fn test_unsupported_checks_are_skipped_and_warned_once_per_key() {
        let mut evaluator = Evaluator::default();
        let a = Path::new("/tree/a");
        let b = Path::new("/tree/b");
        evaluator.skip(OptionKey::Birthtime, a, "no birth time".into());
        evaluator.skip(OptionKey::Birthtime, b, "no birth time".into());
        evaluator.skip(OptionKey::Owner, a, "no ownership".into());

        assert_eq!(evaluator.skipped.len(), 3);
        assert_eq!(evaluator.warned.len(), 2);
        assert!(evaluator.warned.contains(&OptionKey::Birthtime));
        assert!(evaluator.warned.contains(&OptionKey::Owner));

        let keys: Vec<&str> = evaluator.skipped.iter().map(|s| s.key).collect();
        assert_eq!(keys, ["birthtime", "birthtime", "owner"]);
        assert_eq!(evaluator.skipped[1].path, b);
        assert_eq!(evaluator.skipped[2].reason, "no ownership");
    }

    #[test]
    fn test_missing_entry_fails_once() {
        let tmp = tree(&[]);
        let eval = file("a.txt").size(1).evaluate(tmp.path()).unwrap();
        assert_eq!(eval.failures(), &[Failure::at_self("expected it to exist")]);
    }

    #[test]
    fn test_wrong_kind_short_circuits_options() {
        let tmp = tree(&["a/"]);
        let eval = file("a").size(1).content("x").evaluate(tmp.path()).unwrap();
        assert_eq!(
            eval.failures(),
            &[Failure::at_self("expected it to be a regular file")]
        );
    }

    #[test]
    fn test_options_are_independent() {
        let tmp = tree(&["a.txt"]);
        let eval = file("a.txt").size(1).content("x").evaluate(tmp.path()).unwrap();
        let messages: Vec<&str> = eval.failures().iter().map(Failure::message).collect();
        assert_eq!(
            messages,
            vec![
                r#"expected content to be "x", but it was "content""#,
                "expected size to be 1, but it was 7",
            ]
        );
    }

    #[test]
    fn test_self_reference_resolves_to_base() {
        let tmp = tree(&["a.txt"]);
        let eval = be_file().size(7).evaluate(tmp.path().join("a.txt")).unwrap();
        assert!(eval.is_ok());
        assert_eq!(eval.path(), tmp.path().join("a.txt"));
    }

    #[test]
    fn test_exact_containment_reports_extras_sorted() {
        let tmp = tree(&["a.txt", "c.txt", "b.txt"]);
        let eval = be_dir()
            .containing_exactly([file("a.txt")])
            .evaluate(tmp.path())
            .unwrap();
        assert_eq!(
            eval.failures(),
            &[Failure::at_self(
                r#"expected no other entries, but found ["b.txt", "c.txt"]"#
            )]
        );
    }

    #[test]
    fn test_exact_containment_is_skipped_when_children_fail() {
        let tmp = tree(&["a.txt", "extra"]);
        let eval = be_dir()
            .containing_exactly([file("a.txt").size(1)])
            .evaluate(tmp.path())
            .unwrap();
        assert_eq!(
            eval.failures(),
            &[Failure::new("a.txt", "expected size to be 1, but it was 7")]
        );
    }

    #[test]
    fn test_subset_containment_ignores_extras() {
        let tmp = tree(&["a.txt", "extra"]);
        let eval = be_dir().containing([file("a.txt")]).evaluate(tmp.path()).unwrap();
        assert!(eval.is_ok());
    }

    #[test]
    fn test_negative_entry_attributes_to_its_own_name() {
        let tmp = tree(&["keep.txt", "debug.log"]);
        let eval = be_dir()
            .containing([Child::from(file("keep.txt")), Child::from(no_file("debug.log"))])
            .evaluate(tmp.path())
            .unwrap();
        assert_eq!(
            eval.failures(),
            &[Failure::new("debug.log", "expected file not to be found, but it exists")]
        );
    }

    #[test]
    fn test_negative_entry_ignores_other_kinds() {
        let tmp = tree(&["cache/"]);
        let eval = be_dir()
            .containing([no_file("cache")])
            .evaluate(tmp.path())
            .unwrap();
        assert!(eval.is_ok());

        let eval = be_dir().containing([no_dir("cache")]).evaluate(tmp.path()).unwrap();
        assert!(!eval.is_ok());
    }

    #[test]
    fn test_negative_names_are_not_subtracted_from_extras() {
        let tmp = tree(&["a.txt"]);
        let eval = be_dir()
            .containing_exactly([Child::from(file("a.txt")), Child::from(no_file("b.txt"))])
            .evaluate(tmp.path())
            .unwrap();
        assert!(eval.is_ok());

        // An existing directory named like an absent file is still undeclared.
        let tmp = tree(&["a.txt", "b.txt/"]);
        let eval = be_dir()
            .containing_exactly([Child::from(file("a.txt")), Child::from(no_file("b.txt"))])
            .evaluate(tmp.path())
            .unwrap();
        assert_eq!(
            eval.failures(),
            &[Failure::at_self(r#"expected no other entries, but found ["b.txt"]"#)]
        );
    }

    #[test]
    fn test_doubly_nested_path_attribution() {
        let tmp = tree(&["dir/subdir/child"]);
        let spec = be_dir().containing([dir("subdir").containing([file("child").size(1)])]);
        let eval = spec.evaluate(tmp.path().join("dir")).unwrap();
        assert_eq!(
            eval.failures(),
            &[Failure::new("subdir/child", "expected size to be 1, but it was 7")]
        );
    }

    #[test]
    fn test_configuration_error_aborts_before_io() {
        let err = file("a").size("big").evaluate("/definitely/not/here").unwrap_err();
        assert_eq!(err.problems().len(), 1);
    }

    #[test]
    fn test_reuse_of_nested_spec_under_several_parents() {
        let tmp = tree(&["one/readme", "two/other"]);
        let readme = file("readme");
        let spec = be_dir().containing([
            dir("one").containing([readme.clone()]),
            dir("two").containing([readme]),
        ]);
        let eval = spec.evaluate(tmp.path()).unwrap();
        assert_eq!(
            eval.failures(),
            &[Failure::new("two/readme", "expected it to exist")]
        );
    }

    #[test]
    fn test_evaluate_negated() {
        let tmp = tree(&["a.txt"]);
        assert!(!file("a.txt").evaluate_negated(tmp.path()).unwrap());
        assert!(dir("a.txt").evaluate_negated(tmp.path()).unwrap());
        assert!(file("b.txt").evaluate_negated(tmp.path()).unwrap());

        let err = file("a.txt").size(1).evaluate_negated(tmp.path()).unwrap_err();
        assert_eq!(
            err.problems(),
            &["a negated file expectation cannot be given options"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_options_use_the_link() {
        let tmp = tree(&["target.txt"]);
        std::os::unix::fs::symlink("target.txt", tmp.path().join("link")).unwrap();

        let eval = symlink("link")
            .target("target.txt")
            .target_exist(true)
            .target_type("file")
            .evaluate(tmp.path())
            .unwrap();
        assert!(eval.is_ok(), "{}", eval.report());

        // A symlink to a file also satisfies a file expectation.
        assert!(file("link").evaluate(tmp.path()).unwrap().is_ok());
    }
}
