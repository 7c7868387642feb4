//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Watched folder configuration.
    pub watch: WatchConfig,
    /// Destination storage configuration.
    pub storage: StorageSettings,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Watched folder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchConfig {
    /// Folder observed for newly created files.
    pub input_folder: PathBuf,
    /// Glob applied to the leaf file name.
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
}

impl WatchConfig {
    /// Default glob, matching the invoice PDFs dropped by the billing system.
    pub const DEFAULT_FILE_PATTERN: &'static str = "*.PDF";

    /// Create a watch configuration with the default file pattern.
    #[must_use]
    pub fn new(input_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_folder: input_folder.into(),
            file_pattern: default_file_pattern(),
        }
    }

    /// Override the file pattern.
    #[must_use]
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }
}

fn default_file_pattern() -> String {
    WatchConfig::DEFAULT_FILE_PATTERN.to_string()
}

/// Which storage backend receives the uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Azure Blob Storage.
    #[default]
    Azure,
    /// S3-compatible storage.
    S3,
    /// Local filesystem (development only).
    Fs,
    /// In-process memory (dry runs).
    Memory,
}

/// Raw storage settings as read from configuration sources.
///
/// Which fields are required depends on [`StorageKind`]; the core crate
/// validates them when building the storage provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Backend kind.
    #[serde(default)]
    pub provider: StorageKind,
    /// Container (or bucket) receiving the uploads.
    #[serde(default)]
    pub container: String,
    /// Azure storage connection string.
    pub connection_string: Option<String>,
    /// Azure storage account name (when no connection string is given).
    pub account: Option<String>,
    /// Azure account key or S3 secret access key.
    pub access_key: Option<String>,
    /// S3 access key ID.
    pub access_key_id: Option<String>,
    /// Endpoint URL override.
    pub endpoint: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// Root directory for the filesystem backend.
    pub root: Option<PathBuf>,
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the rolling log files.
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    /// Number of daily log files kept on disk.
    #[serde(default = "default_retained_files")]
    pub retained_files: usize,
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            retained_files: default_retained_files(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_retained_files() -> usize {
    90
}

fn default_log_filter() -> String {
    "blobdrop=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is incomplete.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BLOBDROP").separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Checks values serde cannot express as required.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending key.
    pub fn validate(&self) -> AppResult<()> {
        if self.watch.input_folder.as_os_str().is_empty() {
            return Err(AppError::Configuration(
                "watch.input_folder must not be empty".into(),
            ));
        }
        if self.watch.file_pattern.trim().is_empty() {
            return Err(AppError::Configuration(
                "watch.file_pattern must not be empty".into(),
            ));
        }
        if self.logging.retained_files == 0 {
            return Err(AppError::Configuration(
                "logging.retained_files must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
