//! # Option Protocol
//!
//! An option is one named attribute check (size, owner, mtime, ...) that
//! plugs into any [`Specification`]. Every option follows the same
//! protocol:
//!
//! 1. **Static validation**: before any I/O, the expected value must be
//!    a predicate or a literal of one of the option's accepted
//!    [`ValueKind`]s. Violations are configuration problems.
//! 2. **Fetch**: read the actual value from disk. A fetch may report
//!    [`FetchError::Unsupported`] (the check is skipped with a warning)
//!    or [`FetchError::Failed`] (the check fails with that message and no
//!    comparison runs).
//! 3. **Compare**: predicates judge the actual value themselves;
//!    literals are normalized and compared with the option's literal rule
//!    (equality unless the option overrides it).
//!
//! Failure messages quote the actual value only while it is short; long
//! values are summarized as "it was not" / "it did not".
//!
//! [`Specification`]: crate::spec::Specification

mod content;
mod identity;
mod stat;
mod symlink;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::FetchError;
use crate::predicate::{Expected, Predicate};
use crate::spec::EntryKind;
use crate::value::{Value, ValueKind};

/// Actual values rendered longer than this are left out of messages.
pub const MAX_ACTUAL_LEN: usize = 100;

/// The attribute keys the engine knows about.
///
/// Declaration order is the order constraints are evaluated and
/// described in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    Atime,
    Birthtime,
    Content,
    Ctime,
    Group,
    JsonContent,
    Mode,
    Mtime,
    Owner,
    Size,
    Target,
    TargetExist,
    TargetType,
    YamlContent,
}

impl OptionKey {
    pub const ALL: [OptionKey; 14] = [
        Self::Atime,
        Self::Birthtime,
        Self::Content,
        Self::Ctime,
        Self::Group,
        Self::JsonContent,
        Self::Mode,
        Self::Mtime,
        Self::Owner,
        Self::Size,
        Self::Target,
        Self::TargetExist,
        Self::TargetType,
        Self::YamlContent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atime => "atime",
            Self::Birthtime => "birthtime",
            Self::Content => "content",
            Self::Ctime => "ctime",
            Self::Group => "group",
            Self::JsonContent => "json_content",
            Self::Mode => "mode",
            Self::Mtime => "mtime",
            Self::Owner => "owner",
            Self::Size => "size",
            Self::Target => "target",
            Self::TargetExist => "target_exist",
            Self::TargetType => "target_type",
            Self::YamlContent => "yaml_content",
        }
    }

    /// Whether this option may be used on an entry of `kind`.
    pub fn applies_to(&self, kind: EntryKind) -> bool {
        match self {
            Self::Atime | Self::Birthtime | Self::Ctime | Self::Mtime | Self::Owner | Self::Group => {
                true
            }
            Self::Mode => kind != EntryKind::Symlink,
            Self::Size | Self::Content | Self::JsonContent | Self::YamlContent => {
                kind == EntryKind::File
            }
            Self::Target | Self::TargetExist | Self::TargetType => kind == EntryKind::Symlink,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown option `{s}`"))
    }
}

/// The static definition of one option.
///
/// Only [`key`], [`valid_literal_kinds`] and [`fetch_actual`] are
/// required; the remaining methods carry the default protocol and are
/// overridden by options with special literal rules.
///
/// [`key`]: OptionDefinition::key
/// [`valid_literal_kinds`]: OptionDefinition::valid_literal_kinds
/// [`fetch_actual`]: OptionDefinition::fetch_actual
pub trait OptionDefinition: Send + Sync {
    fn key(&self) -> OptionKey;

    /// Literal kinds accepted in addition to a predicate.
    fn valid_literal_kinds(&self) -> &'static [ValueKind];

    /// Read the attribute from `path`. `follow_links` is `false` when the
    /// entry under test is itself a symlink.
    fn fetch_actual(&self, path: &Path, follow_links: bool) -> Result<Value, FetchError>;

    /// Name used in failure messages.
    fn label(&self) -> &'static str {
        self.key().as_str()
    }

    /// Checks beyond the literal's kind, e.g. that a text timestamp parses.
    fn validate_literal(&self, _literal: &Value) -> Result<(), String> {
        Ok(())
    }

    /// Coerce a validated literal into the form `fetch_actual` produces.
    fn normalize_literal(&self, expected: &Value) -> Value {
        expected.clone()
    }

    fn literal_match(&self, actual: &Value, expected: &Value) -> bool {
        actual == expected
    }

    fn literal_failure_message(&self, actual: &Value, expected: &Value) -> String {
        format!(
            "expected {} to be {expected}, but {}",
            self.label(),
            summarize(actual, "it was not")
        )
    }

    fn predicate_failure_message(&self, actual: &Value, expected: &dyn Predicate) -> String {
        format!(
            "expected {} to {}, but {}",
            self.label(),
            expected.describe(),
            summarize(actual, "it did not")
        )
    }
}

/// `it was <actual>` for short values, `fallback` for long ones.
pub(crate) fn summarize(actual: &Value, fallback: &str) -> String {
    let rendered = actual.to_string();
    if rendered.chars().count() > MAX_ACTUAL_LEN {
        fallback.to_string()
    } else {
        format!("it was {rendered}")
    }
}

/// Look up the definition for `key`.
pub fn definition(key: OptionKey) -> &'static dyn OptionDefinition {
    match key {
        OptionKey::Atime => &stat::ATIME,
        OptionKey::Birthtime => &stat::BIRTHTIME,
        OptionKey::Ctime => &stat::CTIME,
        OptionKey::Mtime => &stat::MTIME,
        OptionKey::Mode => &stat::Mode,
        OptionKey::Size => &stat::Size,
        OptionKey::Owner => &identity::OWNER,
        OptionKey::Group => &identity::GROUP,
        OptionKey::Content => &content::Content,
        OptionKey::JsonContent => &content::JSON_CONTENT,
        OptionKey::YamlContent => &content::YAML_CONTENT,
        OptionKey::Target => &symlink::Target,
        OptionKey::TargetExist => &symlink::TargetExist,
        OptionKey::TargetType => &symlink::TargetType,
    }
}

/// Static validation of one constraint on an entry of `kind`.
///
/// Returns the configuration problem, if any.
pub fn validate_expected(key: OptionKey, kind: EntryKind, expected: &Expected) -> Option<String> {
    if !key.applies_to(kind) {
        return Some(format!("option `{key}:` is not supported for a {kind}"));
    }

    let literal = match expected {
        Expected::Predicate(_) => return None,
        Expected::Literal(v) => v,
    };

    let def = definition(key);
    let kinds = def.valid_literal_kinds();
    if !kinds.contains(&literal.kind()) {
        let mut names = vec!["Predicate"];
        names.extend(kinds.iter().map(ValueKind::as_str));
        return Some(format!(
            "expected `{key}:` to be a {}, but it was {literal}",
            to_sentence(&names, "or")
        ));
    }

    def.validate_literal(literal)
        .err()
        .map(|reason| format!("expected `{key}:` to be {reason}, but it was {literal}"))
}

/// Result of running one option check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    /// Failure message, attributed to the entry under test.
    Failed(String),
    /// The attribute is unsupported here; carries the reason.
    Skipped(String),
}

/// Run one option check against `path`.
///
/// Assumes `expected` already passed [`validate_expected`].
pub fn check(
    key: OptionKey,
    path: &Path,
    follow_links: bool,
    expected: &Expected,
) -> CheckOutcome {
    let def = definition(key);

    let actual = match def.fetch_actual(path, follow_links) {
        Ok(actual) => actual,
        Err(FetchError::Unsupported(reason)) => return CheckOutcome::Skipped(reason),
        Err(FetchError::Failed(message)) => return CheckOutcome::Failed(message),
    };

    match expected {
        Expected::Predicate(p) => {
            if p.matches(&actual) {
                CheckOutcome::Passed
            } else {
                CheckOutcome::Failed(def.predicate_failure_message(&actual, p.as_ref()))
            }
        }
        Expected::Literal(literal) => {
            let literal = def.normalize_literal(literal);
            if def.literal_match(&actual, &literal) {
                CheckOutcome::Passed
            } else {
                CheckOutcome::Failed(def.literal_failure_message(&actual, &literal))
            }
        }
    }
}

/// `a`, `a or b`, `a, b, or c`.
fn to_sentence(words: &[&str], conjunction: &str) -> String {
    match words {
        [] => String::new(),
        [one] => (*one).to_string(),
        [a, b] => format!("{a} {conjunction} {b}"),
        [init @ .., last] => format!("{}, {conjunction} {last}", init.join(", ")),
    }
}
