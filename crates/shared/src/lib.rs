//! Shared configuration and error types for Blobdrop.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration (watch folder, storage target, logging)
//! - Application-wide error types

pub mod config;
pub mod error;

pub use config::{AppConfig, LoggingConfig, StorageKind, StorageSettings, WatchConfig};
pub use error::{AppError, AppResult};
