//! # Failures and Reports
//!
//! A [`Failure`] is one unmet expectation, attributed to a path relative
//! to the evaluated entry (`"."` for the entry itself). Failures from
//! nested specifications are re-attributed under their parent's name as
//! they bubble up, so the root evaluation sees paths like
//! `lib/app/version.rb`.
//!
//! [`FailureReport`] groups failures by relative path, keeping the order
//! in which paths were first seen, and renders them for a test harness:
//!
//! ```text
//! /tmp/app was not as expected:
//!       expected mode to be "0755", but it was "0700"
//!   - config.yml
//!       expected content to be "a", but it was "b"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Relative path that denotes the evaluated entry itself.
pub const SELF_PATH: &str = ".";

/// One unmet expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    relative_path: String,
    message: String,
}

impl Failure {
    pub fn new(relative_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            message: message.into(),
        }
    }

    /// A failure on the evaluated entry itself.
    pub fn at_self(message: impl Into<String>) -> Self {
        Self::new(SELF_PATH, message)
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Re-attribute a failure reported by the child entry `name`.
    pub(crate) fn nested_under(self, name: &str) -> Self {
        let relative_path = if self.relative_path == SELF_PATH {
            name.to_string()
        } else {
            format!("{name}/{}", self.relative_path)
        };
        Self {
            relative_path,
            message: self.message,
        }
    }
}

/// Messages reported for one relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureGroup {
    pub relative_path: String,
    pub messages: Vec<String>,
}

/// Failures grouped by relative path, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    path: PathBuf,
    groups: Vec<FailureGroup>,
}

impl FailureReport {
    /// Group `failures` for the entry evaluated at `path`.
    pub fn new(path: impl AsRef<Path>, failures: &[Failure]) -> Self {
        let mut groups: Vec<FailureGroup> = Vec::new();
        for failure in failures {
            match groups
                .iter_mut()
                .find(|g| g.relative_path == failure.relative_path)
            {
                Some(group) => group.messages.push(failure.message.clone()),
                None => groups.push(FailureGroup {
                    relative_path: failure.relative_path.clone(),
                    messages: vec![failure.message.clone()],
                }),
            }
        }
        Self {
            path: path.as_ref().to_path_buf(),
            groups,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn groups(&self) -> &[FailureGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was not as expected:", self.path.display())?;
        for group in &self.groups {
            if group.relative_path != SELF_PATH {
                write!(f, "\n  - {}", group.relative_path)?;
            }
            for message in &group.messages {
                for line in message.lines() {
                    write!(f, "\n      {line}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_under_self_becomes_child_name() {
        let f = Failure::at_self("boom").nested_under("child");
        assert_eq!(f.relative_path(), "child");
        assert_eq!(f.message(), "boom");
    }

    #[test]
    fn test_nested_under_prefixes_deeper_paths() {
        let f = Failure::new("a/b", "boom").nested_under("child");
        assert_eq!(f.relative_path(), "child/a/b");
    }

    #[test]
    fn test_report_groups_in_discovery_order() {
        let failures = vec![
            Failure::new("bin/setup", "expected mode to be \"0644\", but it was \"0755\""),
            Failure::new("lib/version.rb", "expected content to include \"1\""),
            Failure::new("bin/setup", "expected owner to be \"root\", but it was \"dev\""),
        ];
        let report = FailureReport::new("/base", &failures);

        assert_eq!(report.groups().len(), 2);
        assert_eq!(report.groups()[0].relative_path, "bin/setup");
        assert_eq!(report.groups()[0].messages.len(), 2);

        let expected = "/base was not as expected:
  - bin/setup
      expected mode to be \"0644\", but it was \"0755\"
      expected owner to be \"root\", but it was \"dev\"
  - lib/version.rb
      expected content to include \"1\"";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_report_is_empty_without_failures() {
        assert!(FailureReport::new("/base", &[]).is_empty());
        assert!(!FailureReport::new("/base", &[Failure::at_self("boom")]).is_empty());
    }

    #[test]
    fn test_report_root_group_is_unlabeled() {
        let failures = vec![Failure::at_self("expected no other entries, but found [\"x\"]")];
        let report = FailureReport::new("/dist", &failures);
        assert_eq!(
            report.to_string(),
            "/dist was not as expected:\n      expected no other entries, but found [\"x\"]"
        );
    }

    #[test]
    fn test_report_indents_multiline_messages() {
        let failures = vec![Failure::new("a", "line one\nline two")];
        let report = FailureReport::new("/base", &failures);
        assert_eq!(
            report.to_string(),
            "/base was not as expected:\n  - a\n      line one\n      line two"
        );
    }
}
