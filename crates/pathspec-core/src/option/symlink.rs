//! Symlink target options. These always inspect the link itself, never
//! what it points to, except where the option is about the target.

use std::io;
use std::path::{Path, PathBuf};

use super::{OptionDefinition, OptionKey};
use crate::error::FetchError;
use crate::fs;
use crate::value::{Value, ValueKind};

fn link_error(path: &Path, e: io::Error) -> FetchError {
    FetchError::Failed(format!("cannot read link '{}': {e}", path.display()))
}

fn read_link(path: &Path) -> Result<PathBuf, FetchError> {
    std::fs::read_link(path).map_err(|e| link_error(path, e))
}

fn resolve(path: &Path) -> Result<PathBuf, FetchError> {
    fs::resolve_link(path).map_err(|e| link_error(path, e))
}

/// The raw link target, as stored in the link.
#[derive(Debug)]
pub(super) struct Target;

impl OptionDefinition for Target {
    fn key(&self) -> OptionKey {
        OptionKey::Target
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Text]
    }

    fn fetch_actual(&self, path: &Path, _follow_links: bool) -> Result<Value, FetchError> {
        let target = read_link(path)?;
        Ok(Value::Text(target.to_string_lossy().into_owned()))
    }
}

/// Whether the link resolves to an existing entry.
#[derive(Debug)]
pub(super) struct TargetExist;

impl OptionDefinition for TargetExist {
    fn key(&self) -> OptionKey {
        OptionKey::TargetExist
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Bool]
    }

    fn fetch_actual(&self, path: &Path, _follow_links: bool) -> Result<Value, FetchError> {
        let resolved = resolve(path)?;
        Ok(Value::Bool(resolved.exists()))
    }
}

/// File type of the link target: `file`, `directory`, `link`, ...
#[derive(Debug)]
pub(super) struct TargetType;

const TARGET_TYPES: &[&str] = &[
    "file",
    "directory",
    "link",
    "characterSpecial",
    "blockSpecial",
    "fifo",
    "socket",
    "unknown",
];

impl OptionDefinition for TargetType {
    fn key(&self) -> OptionKey {
        OptionKey::TargetType
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Text]
    }

    fn validate_literal(&self, literal: &Value) -> Result<(), String> {
        match literal.as_text() {
            Some(t) if TARGET_TYPES.contains(&t) => Ok(()),
            _ => Err(format!("one of {}", TARGET_TYPES.join(", "))),
        }
    }

    fn fetch_actual(&self, path: &Path, _follow_links: bool) -> Result<Value, FetchError> {
        let resolved = resolve(path)?;
        match std::fs::symlink_metadata(&resolved) {
            Ok(meta) => Ok(Value::Text(fs::file_type_name(&meta.file_type()).to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FetchError::Failed(format!(
                "expected the symlink target to exist, but got error: {e}"
            ))),
            Err(e) => Err(FetchError::Failed(format!(
                "cannot stat link target '{}': {e}",
                resolved.display()
            ))),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::option::{check, validate_expected, CheckOutcome};
    use crate::spec::EntryKind;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_target_is_raw_link_text() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("link");
        symlink("target.txt", &link).unwrap();

        assert_eq!(check(OptionKey::Target, &link, false, &"target.txt".into()), CheckOutcome::Passed);
        assert_eq!(
            check(OptionKey::Target, &link, false, &"other.txt".into()),
            CheckOutcome::Failed(r#"expected target to be "other.txt", but it was "target.txt""#.into())
        );
    }

    #[test]
    fn test_target_exist_follows_relative_target() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("link");
        symlink("target.txt", &link).unwrap();

        assert_eq!(
            check(OptionKey::TargetExist, &link, false, &false.into()),
            CheckOutcome::Passed
        );
        std::fs::write(tmp.path().join("target.txt"), "").unwrap();
        assert_eq!(
            check(OptionKey::TargetExist, &link, false, &false.into()),
            CheckOutcome::Failed("expected target_exist to be false, but it was true".into())
        );
    }

    #[test]
    fn test_target_type() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let link = tmp.path().join("link");
        symlink("sub", &link).unwrap();

        assert_eq!(
            check(OptionKey::TargetType, &link, false, &"directory".into()),
            CheckOutcome::Passed
        );
        assert_eq!(
            check(OptionKey::TargetType, &link, false, &"file".into()),
            CheckOutcome::Failed(r#"expected target_type to be "file", but it was "directory""#.into())
        );
    }

    #[test]
    fn test_target_type_of_dangling_link_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("link");
        symlink("missing", &link).unwrap();

        match check(OptionKey::TargetType, &link, false, &"file".into()) {
            CheckOutcome::Failed(msg) => {
                assert!(msg.starts_with("expected the symlink target to exist"), "{msg}")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_target_type_rejects_unknown_name() {
        let problem =
            validate_expected(OptionKey::TargetType, EntryKind::Symlink, &"folder".into()).unwrap();
        assert!(problem.starts_with("expected `target_type:` to be one of file, directory"));
    }
}
