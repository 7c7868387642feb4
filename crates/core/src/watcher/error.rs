//! Watcher error types.

use std::path::PathBuf;

use thiserror::Error;

use super::WatcherState;

/// Errors raised while arming the directory watcher.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// Input folder does not exist or is not a directory.
    #[error("input folder {} does not exist", path.display())]
    FolderMissing {
        /// Configured folder.
        path: PathBuf,
    },

    /// File pattern is not a valid glob.
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Configured pattern.
        pattern: String,
        /// Glob compilation error.
        source: globset::Error,
    },

    /// Watcher was already started, stopped or released.
    #[error("watcher cannot start from state {0:?}")]
    InvalidState(WatcherState),

    /// OS notification backend failure.
    #[error("file notification backend failed: {0}")]
    Notify(#[from] notify::Error),
}

impl WatcherError {
    /// Create a folder missing error.
    #[must_use]
    pub fn folder_missing(path: impl Into<PathBuf>) -> Self {
        Self::FolderMissing { path: path.into() }
    }
}

impl From<WatcherError> for blobdrop_shared::AppError {
    fn from(err: WatcherError) -> Self {
        Self::Watcher(err.to_string())
    }
}
