//! # YAML Manifests
//!
//! Loads a [`Specification`] tree from a YAML document, so a tree can be
//! checked without writing Rust. Each entry is a mapping naming the entry
//! with exactly one of:
//!
//! | key          | meaning                                         |
//! |--------------|-------------------------------------------------|
//! | `root`       | the base path itself (`file`, `directory`, `symlink`) |
//! | `file`       | a file with this name                           |
//! | `dir`        | a directory with this name                      |
//! | `symlink`    | a symlink with this name                        |
//! | `no_file`    | no file with this name may exist                |
//! | `no_dir`     | no directory with this name may exist           |
//! | `no_symlink` | no symlink with this name may exist             |
//!
//! The remaining keys are option keys (`size`, `mode`, `content`, ...)
//! or `containing` / `containing_exactly` with a list of child entries.
//!
//! An option value is either a scalar literal or a single-key predicate
//! mapping: `contains`, `gt`, `ge`, `lt`, `le`, `one_of`, `not` or
//! `matches`.
//!
//! ```yaml
//! root: directory
//! containing_exactly:
//!   - file: Cargo.toml
//!     content: { contains: "[workspace]" }
//!   - dir: src
//!     mode: "0755"
//!   - no_file: debug.log
//! ```
//!
//! Every problem in the document is collected before returning, the same
//! way specification validation reports its whole tree at once.

use std::path::Path;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_yaml::Value as Yaml;

use crate::error::ManifestError;
use crate::option::OptionKey;
use crate::predicate::{self, Expected};
use crate::spec::{Child, EntryKind, NegativeEntry, Specification};
use crate::value::{yaml_to_json_value, Value};

const ENTRY_KEYS: [&str; 7] = [
    "root",
    "file",
    "dir",
    "symlink",
    "no_file",
    "no_dir",
    "no_symlink",
];

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] if the file cannot be read, and the
/// errors of [`parse_manifest`] otherwise.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Specification, ManifestError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(manifest = %path.display(), "loading manifest");
    parse_manifest(&text)
}

/// Parse a manifest document into a specification tree.
///
/// The returned tree has not been validated; evaluation does that.
///
/// # Errors
///
/// [`ManifestError::Yaml`] for malformed YAML, [`ManifestError::Invalid`]
/// listing every structural problem otherwise.
pub fn parse_manifest(text: &str) -> Result<Specification, ManifestError> {
    let document: Yaml = serde_yaml::from_str(text)?;

    let mut parser = Parser::default();
    let root = parser.entry(&document, "");

    match root {
        Some(Child::Entry(spec)) if parser.problems.is_empty() => Ok(spec),
        Some(Child::Absent(neg)) => {
            parser
                .problems
                .push(format!("{}: the top-level entry cannot be an absent entry", neg.name()));
            Err(ManifestError::Invalid(parser.problems))
        }
        _ => Err(ManifestError::Invalid(parser.problems)),
    }
}

#[derive(Default)]
struct Parser {
    problems: Vec<String>,
}

impl Parser {
    fn problem(&mut self, at: &str, message: impl std::fmt::Display) {
        let at = if at.is_empty() { "." } else { at };
        self.problems.push(format!("{at}: {message}"));
    }

    /// Parse one entry. `parent` is the location of the enclosing entry.
    fn entry(&mut self, node: &Yaml, parent: &str) -> Option<Child> {
        let Some(map) = node.as_mapping() else {
            self.problem(parent, format!("expected an entry mapping, but got {}", yaml_kind(node)));
            return None;
        };

        let named: Vec<(&str, &Yaml)> = map
            .iter()
            .filter_map(|(k, v)| k.as_str().filter(|k| ENTRY_KEYS.contains(k)).map(|k| (k, v)))
            .collect();
        let [(entry_key, name_node)] = named.as_slice() else {
            self.problem(
                parent,
                format!(
                    "an entry needs exactly one of {}, but found {}",
                    ENTRY_KEYS.join(", "),
                    named.len()
                ),
            );
            return None;
        };

        let Some(name) = name_node.as_str() else {
            self.problem(parent, format!("`{entry_key}:` must be a string"));
            return None;
        };
        let at = location(parent, if *entry_key == "root" { "" } else { name });

        let (kind, negated) = match *entry_key {
            "root" => match name {
                "file" => (EntryKind::File, false),
                "directory" | "dir" => (EntryKind::Directory, false),
                "symlink" => (EntryKind::Symlink, false),
                other => {
                    self.problem(
                        &at,
                        format!("`root:` must be file, directory or symlink, but it was {other:?}"),
                    );
                    return None;
                }
            },
            "file" => (EntryKind::File, false),
            "dir" => (EntryKind::Directory, false),
            "symlink" => (EntryKind::Symlink, false),
            "no_file" => (EntryKind::File, true),
            "no_dir" => (EntryKind::Directory, true),
            _ => (EntryKind::Symlink, true),
        };

        if negated {
            if map.len() > 1 {
                self.problem(&at, "an absent entry takes no other keys");
            }
            return Some(Child::Absent(NegativeEntry::new(name, kind)));
        }

        let spec_name = if *entry_key == "root" { "" } else { name };
        let mut spec = Specification::new(spec_name, kind);

        for (key, value) in map {
            let Some(key) = key.as_str() else {
                self.problem(&at, format!("keys must be strings, but got {}", yaml_kind(key)));
                continue;
            };
            if ENTRY_KEYS.contains(&key) {
                continue;
            }
            match key {
                "containing" => {
                    let children = self.children(value, &at);
                    spec = spec.containing(children);
                }
                "containing_exactly" => {
                    let children = self.children(value, &at);
                    spec = spec.containing_exactly(children);
                }
                _ => match key.parse::<OptionKey>() {
                    Ok(option) => {
                        if let Some(expected) = self.expected(option, value, &at) {
                            spec = spec.with(option, expected);
                        }
                    }
                    Err(e) => self.problem(&at, e),
                },
            }
        }
        Some(Child::Entry(spec))
    }

    fn children(&mut self, node: &Yaml, at: &str) -> Vec<Child> {
        let Some(items) = node.as_sequence() else {
            self.problem(at, format!("expected a list of entries, but got {}", yaml_kind(node)));
            return Vec::new();
        };
        items.iter().filter_map(|item| self.entry(item, at)).collect()
    }

    /// A literal or predicate for option `key`.
    fn expected(&mut self, key: OptionKey, node: &Yaml, at: &str) -> Option<Expected> {
        let Some(map) = node.as_mapping() else {
            return self.scalar(key, node, at).map(Expected::Literal);
        };

        let mut pairs = map.iter();
        let (Some((name, arg)), None) = (pairs.next(), pairs.next()) else {
            self.problem(at, format!("`{key}:` predicate must have exactly one key"));
            return None;
        };
        let name = name.as_str().unwrap_or_default();

        match name {
            "contains" => self.argument(key, arg, at).map(predicate::contains),
            "gt" => self.argument(key, arg, at).map(predicate::gt),
            "ge" => self.argument(key, arg, at).map(predicate::ge),
            "lt" => self.argument(key, arg, at).map(predicate::lt),
            "le" => self.argument(key, arg, at).map(predicate::le),
            "one_of" => {
                let Some(items) = arg.as_sequence() else {
                    self.problem(at, format!("`{key}:` one_of expects a list"));
                    return None;
                };
                let values: Option<Vec<Value>> =
                    items.iter().map(|i| self.argument(key, i, at)).collect();
                values.map(predicate::one_of)
            }
            "not" => self.expected(key, arg, at).map(predicate::not),
            "matches" => {
                let Some(source) = arg.as_str() else {
                    self.problem(at, format!("`{key}:` matches expects a string pattern"));
                    return None;
                };
                match Regex::new(source) {
                    Ok(re) if key == OptionKey::Content => Some(Expected::Literal(Value::Pattern(re))),
                    Ok(re) => Some(predicate::matches_pattern(re)),
                    Err(e) => {
                        self.problem(at, format!("`{key}:` invalid pattern: {e}"));
                        None
                    }
                }
            }
            other => {
                self.problem(at, format!("unknown predicate `{other}` for `{key}:`"));
                None
            }
        }
    }

    /// A scalar literal.
    fn scalar(&mut self, key: OptionKey, node: &Yaml, at: &str) -> Option<Value> {
        match node {
            Yaml::Bool(b) => Some(Value::Bool(*b)),
            Yaml::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Integer(i)),
                None => {
                    self.problem(at, format!("`{key}:` numbers must be integers, but it was {n}"));
                    None
                }
            },
            Yaml::String(s) => Some(Value::Text(s.clone())),
            Yaml::Tagged(tagged) => self.scalar(key, &tagged.value, at),
            other => {
                self.problem(at, format!("`{key}:` cannot be {}", yaml_kind(other)));
                None
            }
        }
    }

    /// A predicate argument: scalars as literals (timestamps for time
    /// options), collections as documents.
    fn argument(&mut self, key: OptionKey, node: &Yaml, at: &str) -> Option<Value> {
        match node {
            Yaml::Mapping(_) | Yaml::Sequence(_) => match yaml_to_json_value(node) {
                Ok(doc) => Some(Value::Document(doc)),
                Err(e) => {
                    self.problem(at, format!("`{key}:` {e}"));
                    None
                }
            },
            Yaml::String(s) if is_timestamp(key) => match DateTime::parse_from_rfc3339(s) {
                Ok(t) => Some(Value::Time(t.with_timezone(&Utc))),
                Err(e) => {
                    self.problem(at, format!("`{key}:` expected an RFC 3339 timestamp: {e}"));
                    None
                }
            },
            _ => self.scalar(key, node, at),
        }
    }
}

fn is_timestamp(key: OptionKey) -> bool {
    matches!(
        key,
        OptionKey::Atime | OptionKey::Birthtime | OptionKey::Ctime | OptionKey::Mtime
    )
}

fn location(parent: &str, name: &str) -> String {
    match (parent.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}/{name}"),
    }
}

fn yaml_kind(node: &Yaml) -> &'static str {
    match node {
        Yaml::Null => "null",
        Yaml::Bool(_) => "a boolean",
        Yaml::Number(_) => "a number",
        Yaml::String(_) => "a string",
        Yaml::Sequence(_) => "a list",
        Yaml::Mapping(_) => "a mapping",
        Yaml::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ContainmentMode;

    fn invalid(text: &str) -> Vec<String> {
        match parse_manifest(text) {
            Err(ManifestError::Invalid(problems)) => problems,
            other => panic!("expected invalid manifest, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_nested_tree() {
        let spec = parse_manifest(
            r#"
root: directory
containing_exactly:
  - file: Cargo.toml
    size: { gt: 10 }
  - dir: src
    mode: "0755"
    containing:
      - file: lib.rs
  - no_file: debug.log
"#,
        )
        .unwrap();

        assert!(spec.is_self());
        assert_eq!(spec.kind(), EntryKind::Directory);
        let containment = spec.containment().unwrap();
        assert_eq!(containment.mode(), ContainmentMode::Exact);
        let names: Vec<&str> = containment.children().iter().map(Child::name).collect();
        assert_eq!(names, vec!["Cargo.toml", "src", "debug.log"]);
        assert!(spec.validate().is_ok());
        assert_eq!(
            spec.description(),
            r#"be a directory containing exactly:
  - have file "Cargo.toml" with size be > 10
  - have directory "src" with mode "0755" containing:
    - have file "lib.rs"
  - not have file "debug.log""#
        );
    }

    #[test]
    fn test_predicates() {
        let spec = parse_manifest(
            r#"
file: app.json
json_content: { contains: { env: test } }
owner: { one_of: [root, admin] }
mtime: { gt: "2020-01-01T00:00:00Z" }
content: { not: { matches: "TODO" } }
"#,
        )
        .unwrap();

        let described: Vec<String> = spec
            .constraints()
            .map(|(k, e)| format!("{k} {}", e.describe()))
            .collect();
        assert_eq!(
            described,
            vec![
                "content not match /TODO/",
                r#"json_content include {"env":"test"}"#,
                "mtime be > 2020-01-01T00:00:00Z",
                r#"owner be one of ["root", "admin"]"#,
            ]
        );
    }

    #[test]
    fn test_matches_on_text_options_is_a_predicate() {
        let spec = parse_manifest("symlink: current\ntarget: { matches: '^releases/' }\n").unwrap();
        let (_, expected) = spec.constraints().next().unwrap();
        assert!(matches!(expected, Expected::Predicate(_)));
        assert_eq!(expected.describe(), "match /^releases//");
    }

    #[test]
    fn test_collects_every_problem() {
        let problems = invalid(
            r#"
dir: app
colour: blue
containing:
  - file: a
    size: { between: [1, 2] }
  - size: 3
  - file: b
    mtime: { gt: yesterday }
"#,
        );
        assert_eq!(problems.len(), 4, "{problems:?}");
        assert_eq!(problems[0], "app: unknown option `colour`");
        assert_eq!(problems[1], "app/a: unknown predicate `between` for `size:`");
        assert!(problems[2].starts_with("app: an entry needs exactly one of"));
        assert!(problems[3].starts_with("app/b: `mtime:` expected an RFC 3339 timestamp"));
    }

    #[test]
    fn test_rejects_absent_top_level_and_extra_keys_on_absent_entries() {
        let problems = invalid("no_file: x\n");
        assert_eq!(problems, vec!["x: the top-level entry cannot be an absent entry"]);

        let problems = invalid("root: directory\ncontaining:\n  - no_dir: tmp\n    mode: '0755'\n");
        assert_eq!(problems, vec!["tmp: an absent entry takes no other keys"]);
    }

    #[test]
    fn test_invalid_root_kind() {
        let problems = invalid("root: folder\n");
        assert_eq!(
            problems,
            vec![r#".: `root:` must be file, directory or symlink, but it was "folder""#]
        );
    }

    #[test]
    fn test_literal_type_errors_are_left_to_validation() {
        let spec = parse_manifest("file: a\nsize: big\n").unwrap();
        let err = spec.validate().unwrap_err();
        assert_eq!(
            err.problems(),
            &[r#"expected `size:` to be a Predicate or Integer, but it was "big""#]
        );
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            parse_manifest("root: [unclosed"),
            Err(ManifestError::Yaml(_))
        ));
    }

    #[test]
    fn test_load_manifest_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_manifest(tmp.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
