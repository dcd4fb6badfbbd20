//! # Specifications
//!
//! A [`Specification`] declares what one filesystem entry must look like:
//! its [`EntryKind`], any number of option constraints, and, for
//! directories, a containment clause listing nested specifications and
//! [`NegativeEntry`] assertions.
//!
//! Building a specification is pure data construction; nothing touches
//! the filesystem until [`Specification::evaluate`] runs. Mistakes in
//! how a tree was built (a literal of the wrong type, two containment
//! clauses, an option that does not apply to the entry's kind) are
//! recorded as-is and reported together by [`Specification::validate`].
//!
//! Specifications are immutable once built and hold no per-evaluation
//! state, so one instance can be nested under several parents, evaluated
//! repeatedly, or shared across threads.
//!
//! ```
//! use pathspec_core::{dir, file, no_file, predicate, Child};
//!
//! let app = dir("app").containing_exactly([
//!     Child::from(file("config.yml").content(predicate::contains("environment"))),
//!     Child::from(dir("bin")),
//!     Child::from(no_file("debug.log")),
//! ]);
//! assert!(app.validate().is_ok());
//! ```
//!
//! [`Specification::evaluate`]: crate::spec::Specification::evaluate

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::ConfigurationError;
use crate::option::{self, OptionKey};
use crate::predicate::Expected;

/// The type class of an entry.
///
/// `File` and `Symlink` are leaves; `Directory` is the only container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Message used when something other than this kind is at the path.
    pub(crate) fn wrong_kind_message(&self) -> &'static str {
        match self {
            Self::File => "expected it to be a regular file",
            Self::Directory => "expected it to be a directory",
            Self::Symlink => "expected it to be a symlink",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a directory may hold entries beyond the declared ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainmentMode {
    /// Extra entries are allowed.
    Subset,
    /// Every entry on disk must be positively declared.
    Exact,
}

/// One containment clause: the mode and the declared children.
#[derive(Debug, Clone)]
pub struct Containment {
    pub(crate) mode: ContainmentMode,
    pub(crate) children: Vec<Child>,
}

impl Containment {
    pub fn mode(&self) -> ContainmentMode {
        self.mode
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }
}

/// A declared child of a directory.
#[derive(Debug, Clone)]
pub enum Child {
    /// The entry must exist and satisfy the nested specification.
    Entry(Specification),
    /// No entry of this name and kind may exist.
    Absent(NegativeEntry),
}

impl Child {
    pub fn name(&self) -> &str {
        match self {
            Self::Entry(spec) => spec.name(),
            Self::Absent(neg) => neg.name(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Entry(spec) => spec.description(),
            Self::Absent(neg) => neg.description(),
        }
    }
}

impl From<Specification> for Child {
    fn from(spec: Specification) -> Self {
        Self::Entry(spec)
    }
}

impl From<NegativeEntry> for Child {
    fn from(neg: NegativeEntry) -> Self {
        Self::Absent(neg)
    }
}

/// Asserts that no entry of `kind` named `name` exists.
///
/// Carries no constraints by construction; an entry of a different kind
/// with the same name does not trigger it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegativeEntry {
    name: String,
    kind: EntryKind,
}

impl NegativeEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn description(&self) -> String {
        format!("not have {} {:?}", self.kind, self.name)
    }

    fn collect_problems(&self, problems: &mut Vec<String>) {
        if self.name.is_empty() {
            problems.push(format!("an absent {} must be named", self.kind));
        }
    }
}

/// Declared expectations for one entry.
#[derive(Debug, Clone)]
pub struct Specification {
    name: String,
    kind: EntryKind,
    constraints: BTreeMap<OptionKey, Expected>,
    containment: Vec<Containment>,
}

impl Specification {
    /// A specification for the entry `name` under the evaluated base path.
    /// An empty name refers to the base path itself.
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            constraints: BTreeMap::new(),
            containment: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// `true` when the specification refers to the base path itself.
    pub fn is_self(&self) -> bool {
        self.name.is_empty()
    }

    /// Constraints in evaluation order. Options never set are absent.
    pub fn constraints(&self) -> impl Iterator<Item = (OptionKey, &Expected)> {
        self.constraints.iter().map(|(k, v)| (*k, v))
    }

    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }

    /// The effective containment clause, if any.
    pub fn containment(&self) -> Option<&Containment> {
        self.containment.first()
    }

    /// Constrain option `key`. Setting the same key again replaces it.
    pub fn with(mut self, key: OptionKey, expected: impl Into<Expected>) -> Self {
        self.constraints.insert(key, expected.into());
        self
    }

    pub fn atime(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Atime, expected)
    }

    pub fn birthtime(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Birthtime, expected)
    }

    pub fn ctime(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Ctime, expected)
    }

    pub fn mtime(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Mtime, expected)
    }

    pub fn mode(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Mode, expected)
    }

    pub fn owner(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Owner, expected)
    }

    pub fn group(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Group, expected)
    }

    pub fn size(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Size, expected)
    }

    pub fn content(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Content, expected)
    }

    pub fn json_content(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::JsonContent, expected)
    }

    pub fn yaml_content(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::YamlContent, expected)
    }

    pub fn target(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::Target, expected)
    }

    pub fn target_exist(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::TargetExist, expected)
    }

    pub fn target_type(self, expected: impl Into<Expected>) -> Self {
        self.with(OptionKey::TargetType, expected)
    }

    /// Declare children that must be present; other entries are allowed.
    pub fn containing<I, C>(self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.contain(ContainmentMode::Subset, children)
    }

    /// Declare the complete set of entries the directory may hold.
    pub fn containing_exactly<I, C>(self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.contain(ContainmentMode::Exact, children)
    }

    fn contain<I, C>(mut self, mode: ContainmentMode, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.containment.push(Containment {
            mode,
            children: children.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Check the whole tree for construction mistakes without touching
    /// the filesystem. Every problem is reported, not just the first.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut problems = Vec::new();
        self.collect_problems(&mut problems);
        ConfigurationError::check(problems)
    }

    pub(crate) fn collect_problems(&self, problems: &mut Vec<String>) {
        for (key, expected) in &self.constraints {
            if let Some(problem) = option::validate_expected(*key, self.kind, expected) {
                problems.push(problem);
            }
        }

        if self.containment.is_empty() {
            return;
        }
        if !self.kind.is_container() {
            problems.push(format!("a {} cannot have expectations on its contents", self.kind));
        }
        if self.containment.len() > 1 {
            problems.push("`containing` and `containing_exactly` may be used only once".into());
        }

        for child in self.containment.iter().flat_map(|c| c.children.iter()) {
            match child {
                Child::Entry(spec) => {
                    if spec.is_self() {
                        problems.push(format!("a nested {} must be named", spec.kind));
                    }
                    spec.collect_problems(problems);
                }
                Child::Absent(neg) => neg.collect_problems(problems),
            }
        }
    }

    /// Problems that make the specification unusable for a negated check.
    pub(crate) fn negation_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.has_constraints() {
            problems.push(format!("a negated {} expectation cannot be given options", self.kind));
        }
        if !self.containment.is_empty() {
            problems.push(format!(
                "a negated {} expectation cannot have expectations on its contents",
                self.kind
            ));
        }
        problems
    }

    /// Documentation-style description, e.g.
    /// `have directory "app" with owner "dev" containing:` followed by
    /// one indented line per child.
    pub fn description(&self) -> String {
        let mut desc = if self.is_self() {
            format!("be a {}", self.kind)
        } else {
            format!("have {} {:?}", self.kind, self.name)
        };

        let options: Vec<String> = self
            .constraints
            .iter()
            .map(|(key, expected)| format!("{key} {}", expected.describe()))
            .collect();
        if !options.is_empty() {
            desc.push_str(" with ");
            desc.push_str(&options.join(" and "));
        }

        let Some(containment) = self.containment() else {
            return desc;
        };

        let exactly = match containment.mode {
            ContainmentMode::Exact => " exactly",
            ContainmentMode::Subset => "",
        };
        desc.push_str(&format!(" containing{exactly}:"));
        for child in &containment.children {
            for (i, line) in child.description().lines().enumerate() {
                let bullet = if i == 0 { "- " } else { "  " };
                desc.push_str(&format!("\n  {bullet}{line}"));
            }
        }
        desc
    }
}

/// Expect a file named `name`.
pub fn file(name: impl Into<String>) -> Specification {
    Specification::new(name, EntryKind::File)
}

/// Expect a directory named `name`.
pub fn dir(name: impl Into<String>) -> Specification {
    Specification::new(name, EntryKind::Directory)
}

/// Expect a symlink named `name`.
pub fn symlink(name: impl Into<String>) -> Specification {
    Specification::new(name, EntryKind::Symlink)
}

/// Expect the base path itself to be a file.
pub fn be_file() -> Specification {
    Specification::new("", EntryKind::File)
}

/// Expect the base path itself to be a directory.
pub fn be_dir() -> Specification {
    Specification::new("", EntryKind::Directory)
}

/// Expect the base path itself to be a symlink.
pub fn be_symlink() -> Specification {
    Specification::new("", EntryKind::Symlink)
}

/// Assert no file named `name` exists.
pub fn no_file(name: impl Into<String>) -> NegativeEntry {
    NegativeEntry::new(name, EntryKind::File)
}

/// Assert no directory named `name` exists.
pub fn no_dir(name: impl Into<String>) -> NegativeEntry {
    NegativeEntry::new(name, EntryKind::Directory)
}

/// Assert no symlink named `name` exists.
pub fn no_symlink(name: impl Into<String>) -> NegativeEntry {
    NegativeEntry::new(name, EntryKind::Symlink)
}
