use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the file-system collaborator.
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("target directory does not exist: {}", .0.display())]
    TargetDirMissing(PathBuf),
    #[error("target file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileOpError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::SourceNotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no files to analyze")]
    NoFiles,
    #[error("could not start {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FileOpError,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("new order must be a permutation of the current files ({expected} expected, {got} given)")]
    NotAPermutation { expected: usize, got: usize },
}
