//! Object storage for uploaded files using Apache OpenDAL.
//!
//! Supported backends:
//! - Azure Blob Storage (connection string or account/key)
//! - S3-compatible: Cloudflare R2, AWS S3, MinIO
//! - Local filesystem (development only)
//! - In-memory (tests and dry runs)
//!
//! The transfer pipeline only sees the [`ObjectStore`] trait:
//!
//! ```text
//! ┌──────────────────────┐   put(key, bytes)   ┌───────────────────┐
//! │  TransferPipeline    │ ──────────────────▶ │  StorageService   │
//! └──────────────────────┘                     │  (OpenDAL)        │
//!                                              └───────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{AzureConnectionString, StorageProvider};
pub use error::StorageError;
pub use service::{ObjectStore, StorageService};
