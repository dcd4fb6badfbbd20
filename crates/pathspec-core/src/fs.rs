//! Thin resource-access layer over `std::fs`.
//!
//! Kind tests follow the conventions of classic test matchers: the file
//! and directory tests follow symlinks, the symlink test does not. An
//! entry "exists" if anything is at the path, including a dangling link.

use std::fs::{FileType, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::spec::EntryKind;

/// Returns `true` if anything (even a dangling symlink) is at `path`.
pub fn exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Returns `true` if `path` is an entry of `kind`.
pub fn is_kind(path: &Path, kind: EntryKind) -> bool {
    match kind {
        EntryKind::File => path.is_file(),
        EntryKind::Directory => path.is_dir(),
        EntryKind::Symlink => path.is_symlink(),
    }
}

/// Names of the entries directly inside `dir`, in directory order.
pub fn child_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// `stat` (follow links) or `lstat` (don't) as a fetch result.
pub fn metadata(path: &Path, follow_links: bool) -> Result<Metadata, FetchError> {
    let result = if follow_links {
        std::fs::metadata(path)
    } else {
        std::fs::symlink_metadata(path)
    };
    result.map_err(|e| FetchError::Failed(format!("cannot stat '{}': {e}", path.display())))
}

/// Convert a `SystemTime` into a UTC timestamp, keeping sub-second precision.
pub fn to_utc(t: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}

/// Reads a timestamp accessor, mapping an unsupported platform to
/// [`FetchError::Unsupported`].
pub fn timestamp(
    path: &Path,
    read: io::Result<SystemTime>,
) -> Result<DateTime<Utc>, FetchError> {
    match read {
        Ok(t) => Ok(to_utc(t)),
        Err(e) if e.kind() == io::ErrorKind::Unsupported => {
            Err(FetchError::Unsupported(format!("{} ({e})", path.display())))
        }
        Err(e) => Err(FetchError::Failed(format!(
            "cannot read timestamp of '{}': {e}",
            path.display()
        ))),
    }
}

/// Where a symlink points, resolved relative to the link's directory.
pub fn resolve_link(path: &Path) -> io::Result<PathBuf> {
    let target = std::fs::read_link(path)?;
    Ok(match path.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target,
    })
}

/// File type name as reported by `File.ftype`-style APIs.
pub fn file_type_name(ft: &FileType) -> &'static str {
    if ft.is_symlink() {
        return "link";
    }
    if ft.is_file() {
        return "file";
    }
    if ft.is_dir() {
        return "directory";
    }
    special_file_type_name(ft)
}

#[cfg(unix)]
fn special_file_type_name(ft: &FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if ft.is_char_device() {
        "characterSpecial"
    } else if ft.is_block_device() {
        "blockSpecial"
    } else if ft.is_fifo() {
        "fifo"
    } else if ft.is_socket() {
        "socket"
    } else {
        "unknown"
    }
}

#[cfg(not(unix))]
fn special_file_type_name(_ft: &FileType) -> &'static str {
    "unknown"
}
