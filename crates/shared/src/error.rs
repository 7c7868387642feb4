//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Storage backend could not be initialized.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Folder watcher could not be armed.
    #[error("Watcher error: {0}")]
    Watcher(String),

    /// The host cancelled the operation before it started.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

impl AppError {
    /// Returns the error code used in log records.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Watcher(_) => "WATCHER_ERROR",
            Self::Cancelled(_) => "CANCELLED",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
