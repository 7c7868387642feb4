//! Transfer error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

/// Why a single file was not uploaded.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The source file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source file could not be read to the end.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The storage backend rejected the write.
    #[error("upload of '{key}' failed: {source}")]
    Storage {
        /// Object key.
        key: String,
        /// Storage error.
        source: StorageError,
    },
}

impl TransferError {
    /// Create an open error.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a read error.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a storage error.
    #[must_use]
    pub fn storage(key: impl Into<String>, source: StorageError) -> Self {
        Self::Storage {
            key: key.into(),
            source,
        }
    }
}
