//! Options backed by a single `stat`/`lstat` call: timestamps, mode, size.

use std::path::Path;

use chrono::{DateTime, Utc};

use super::{OptionDefinition, OptionKey};
use crate::error::FetchError;
use crate::fs;
use crate::value::{Value, ValueKind};

const TIME_KINDS: &[ValueKind] = &[ValueKind::Time, ValueKind::Text];

#[derive(Debug, Clone, Copy)]
pub(super) enum TimeField {
    Accessed,
    Born,
    Changed,
    Modified,
}

/// One of the four entry timestamps. Text literals are RFC 3339 and are
/// normalized to UTC before comparison.
#[derive(Debug)]
pub(super) struct Timestamp(TimeField);

pub(super) static ATIME: Timestamp = Timestamp(TimeField::Accessed);
pub(super) static BIRTHTIME: Timestamp = Timestamp(TimeField::Born);
pub(super) static CTIME: Timestamp = Timestamp(TimeField::Changed);
pub(super) static MTIME: Timestamp = Timestamp(TimeField::Modified);

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl OptionDefinition for Timestamp {
    fn key(&self) -> OptionKey {
        match self.0 {
            TimeField::Accessed => OptionKey::Atime,
            TimeField::Born => OptionKey::Birthtime,
            TimeField::Changed => OptionKey::Ctime,
            TimeField::Modified => OptionKey::Mtime,
        }
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        TIME_KINDS
    }

    fn validate_literal(&self, literal: &Value) -> Result<(), String> {
        match literal {
            Value::Text(s) if parse_time(s).is_none() => Err("an RFC 3339 timestamp".into()),
            _ => Ok(()),
        }
    }

    fn normalize_literal(&self, expected: &Value) -> Value {
        match expected {
            Value::Text(s) => parse_time(s).map_or_else(|| expected.clone(), Value::Time),
            other => other.clone(),
        }
    }

    fn fetch_actual(&self, path: &Path, follow_links: bool) -> Result<Value, FetchError> {
        let meta = fs::metadata(path, follow_links)?;
        let time = match self.0 {
            TimeField::Accessed => fs::timestamp(path, meta.accessed())?,
            TimeField::Born => fs::timestamp(path, meta.created())?,
            TimeField::Modified => fs::timestamp(path, meta.modified())?,
            TimeField::Changed => changed_time(path, &meta)?,
        };
        Ok(Value::Time(time))
    }
}

#[cfg(unix)]
fn changed_time(path: &Path, meta: &std::fs::Metadata) -> Result<DateTime<Utc>, FetchError> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(meta.ctime_nsec()).unwrap_or(0);
    DateTime::from_timestamp(meta.ctime(), nanos).ok_or_else(|| {
        FetchError::Failed(format!("ctime of '{}' is out of range", path.display()))
    })
}

#[cfg(not(unix))]
fn changed_time(path: &Path, _meta: &std::fs::Metadata) -> Result<DateTime<Utc>, FetchError> {
    Err(FetchError::Unsupported(path.display().to_string()))
}

/// Permission bits as four octal digits, e.g. `"0644"`.
#[derive(Debug)]
pub(super) struct Mode;

impl OptionDefinition for Mode {
    fn key(&self) -> OptionKey {
        OptionKey::Mode
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Text]
    }

    fn validate_literal(&self, literal: &Value) -> Result<(), String> {
        let ok = literal.as_text().is_some_and(|s| {
            s.len() == 4 && s.chars().all(|c| c.is_digit(8))
        });
        if ok {
            Ok(())
        } else {
            Err("four octal digits like \"0644\"".into())
        }
    }

    #[cfg(unix)]
    fn fetch_actual(&self, path: &Path, follow_links: bool) -> Result<Value, FetchError> {
        use std::os::unix::fs::PermissionsExt;

        let meta = fs::metadata(path, follow_links)?;
        Ok(Value::Text(format!("{:04o}", meta.permissions().mode() & 0o7777)))
    }

    #[cfg(not(unix))]
    fn fetch_actual(&self, path: &Path, _follow_links: bool) -> Result<Value, FetchError> {
        Err(FetchError::Unsupported(path.display().to_string()))
    }
}

/// Length in bytes.
#[derive(Debug)]
pub(super) struct Size;

impl OptionDefinition for Size {
    fn key(&self) -> OptionKey {
        OptionKey::Size
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Integer]
    }

    fn validate_literal(&self, literal: &Value) -> Result<(), String> {
        match literal.as_integer() {
            Some(i) if i < 0 => Err("a non-negative Integer".into()),
            _ => Ok(()),
        }
    }

    fn fetch_actual(&self, path: &Path, follow_links: bool) -> Result<Value, FetchError> {
        let meta = fs::metadata(path, follow_links)?;
        Ok(Value::from(meta.len()))
    }
}
