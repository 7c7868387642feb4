//! Folder-to-blob upload pipeline for Blobdrop.
//!
//! # Modules
//!
//! - `watcher` - Directory watching, event normalization and dedup
//! - `pipeline` - Single-file upload with per-file failure isolation
//! - `storage` - Object storage backends (Azure Blob, S3, local, memory)
//! - `service` - Hosted service tying the watcher to the pipeline

pub mod pipeline;
pub mod service;
pub mod storage;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use service::{LoopStats, StartOutcome, UploadService};
