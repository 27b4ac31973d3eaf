//! Filesystem checks run before any bytes move.

use crate::error::{IssueKind, Result, SourceIssue, SplitError};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Classifies why `path` cannot serve as a readable regular source file.
pub fn source_issue(path: &Path) -> Option<IssueKind> {
    let md = match fs::metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == ErrorKind::NotFound => return Some(IssueKind::NotFound),
        Err(_) => return Some(IssueKind::Unreadable),
    };
    if md.is_dir() {
        return Some(IssueKind::IsDirectory);
    }
    match File::open(path) {
        Ok(_) => None,
        Err(e) if e.kind() == ErrorKind::NotFound => Some(IssueKind::NotFound),
        Err(_) => Some(IssueKind::Unreadable),
    }
}

/// Fails fast on an unusable primary source; returns its size.
pub fn check_source_file(path: &Path) -> Result<u64> {
    match source_issue(path) {
        Some(IssueKind::NotFound) => Err(SplitError::SourceNotFound(path.to_path_buf())),
        Some(IssueKind::Unreadable) => Err(SplitError::SourceUnreadable(path.to_path_buf())),
        Some(IssueKind::IsDirectory) => Err(SplitError::SourceIsDirectory(path.to_path_buf())),
        None => Ok(fs::metadata(path)?.len()),
    }
}

/// Checks every path and returns the failures in input order.
pub fn scan_sources<P: AsRef<Path>>(sources: &[P]) -> Vec<SourceIssue> {
    sources
        .iter()
        .filter_map(|p| {
            let path = p.as_ref();
            source_issue(path).map(|kind| SourceIssue {
                path: path.to_path_buf(),
                kind,
            })
        })
        .collect()
}

pub fn check_source_dir(path: &Path) -> Result<()> {
    let md = match fs::metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SplitError::SourceDirectoryNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if !md.is_dir() {
        return Err(SplitError::SourceNotDirectory(path.to_path_buf()));
    }
    if fs::read_dir(path).is_err() {
        return Err(SplitError::SourceUnreadable(path.to_path_buf()));
    }
    Ok(())
}

/// Makes sure `dir` is a writable directory, creating it (and its parents)
/// when missing.
///
/// Writability is tested with a real anonymous temp file, so ownership and
/// ACLs count, not just the mode bits.
pub fn prepare_dest_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(md) if !md.is_dir() => return Err(SplitError::destination(dir, "not a directory")),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| {
                SplitError::destination(dir, format!("cannot create directory: {e}"))
            })?;
        }
        Err(e) => return Err(e.into()),
    }
    tempfile::tempfile_in(dir)
        .map(drop)
        .map_err(|e| SplitError::destination(dir, format!("not writable: {e}")))
}

/// Replaces whatever file sits at `path` with a fresh empty one.
pub fn prepare_dest_file(path: &Path) -> Result<File> {
    match fs::metadata(path) {
        Ok(md) if md.is_dir() => return Err(SplitError::destination(path, "is a directory")),
        Ok(md) if md.permissions().readonly() => {
            return Err(SplitError::destination(path, "not writable"));
        }
        Ok(_) => fs::remove_file(path).map_err(|e| dest_io(path, "cannot replace file", e))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    File::create(path).map_err(|e| dest_io(path, "cannot create file", e))
}

fn dest_io(path: &Path, what: &str, e: std::io::Error) -> SplitError {
    match e.kind() {
        ErrorKind::PermissionDenied | ErrorKind::NotFound | ErrorKind::ReadOnlyFilesystem => {
            SplitError::destination(path, format!("{what}: {e}"))
        }
        _ => e.into(),
    }
}

/// Deletes a file, logging instead of failing. Returns whether it was removed.
pub fn remove_file_best_effort(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not delete file");
            false
        }
    }
}
