use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing the task document.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no file name: {0}")]
    InvalidPath(PathBuf),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Persist {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying failure is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Top-level failures that abort the application.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot open document: {0}")]
    Open(#[from] StorageError),

    #[error("Terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}
