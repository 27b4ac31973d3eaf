use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("source not readable: {}", .0.display())]
    SourceUnreadable(PathBuf),

    #[error("source is a directory: {}", .0.display())]
    SourceIsDirectory(PathBuf),

    #[error("source directory does not exist: {}", .0.display())]
    SourceDirectoryNotFound(PathBuf),

    #[error("source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("no files in source directory: {}", .0.display())]
    SourceDirectoryEmpty(PathBuf),

    #[error("{} source(s) failed validation: {}", .0.len(), join_issues(.0))]
    InvalidSources(Vec<SourceIssue>),

    #[error("destination {} is invalid: {reason}", .path.display())]
    DestinationInvalid { path: PathBuf, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("short read: expected {expected} bytes, stream ended after {actual}")]
    ShortRead { expected: u64, actual: u64 },

    #[error("digest error: {0}")]
    Digest(String),

    #[error("verify mismatch: expected {expected}, got {actual}")]
    VerifyMismatch { expected: String, actual: String },
}

impl SplitError {
    pub(crate) fn destination(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SplitError::DestinationInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueKind {
    NotFound,
    Unreadable,
    IsDirectory,
}

/// One failed item from a bulk source scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceIssue {
    pub path: PathBuf,
    pub kind: IssueKind,
}

impl fmt::Display for SourceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            IssueKind::NotFound => "does not exist",
            IssueKind::Unreadable => "not readable",
            IssueKind::IsDirectory => "is a directory",
        };
        write!(f, "{} {}", self.path.display(), what)
    }
}

fn join_issues(issues: &[SourceIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: SplitError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, SplitError::Io(_)));
    }

    #[test]
    fn invalid_sources_lists_every_issue() {
        let err = SplitError::InvalidSources(vec![
            SourceIssue {
                path: PathBuf::from("a-0.split"),
                kind: IssueKind::NotFound,
            },
            SourceIssue {
                path: PathBuf::from("a-1.split"),
                kind: IssueKind::IsDirectory,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 source(s) failed validation"));
        assert!(msg.contains("a-0.split does not exist"));
        assert!(msg.contains("a-1.split is a directory"));
    }
}
