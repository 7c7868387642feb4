//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object not found in storage.
    #[error("object not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Credentials rejected or container not writable.
    #[error("access denied: {0}")]
    PermissionDenied(String),

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<StorageError> for blobdrop_shared::AppError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_opendal_error() {
        let err: StorageError =
            opendal::Error::new(opendal::ErrorKind::PermissionDenied, "403").into();
        assert!(matches!(err, StorageError::PermissionDenied(_)));

        let err: StorageError =
            opendal::Error::new(opendal::ErrorKind::Unexpected, "connection reset").into();
        assert!(matches!(err, StorageError::Operation(ref m) if m.contains("connection reset")));
    }

    #[test]
    fn test_into_app_error() {
        let err: blobdrop_shared::AppError = StorageError::configuration("bad key").into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
