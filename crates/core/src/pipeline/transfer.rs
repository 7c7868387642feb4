//! Upload of a single created file.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use super::error::TransferError;
use crate::storage::ObjectStore;
use crate::watcher::FileEvent;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Object key written.
    pub key: String,
    /// Number of bytes written.
    pub bytes: u64,
}

/// Uploads created files to the configured container.
///
/// Holds no per-file state; every call opens its own file handle.
pub struct TransferPipeline<S: ObjectStore> {
    store: Arc<S>,
}

impl<S: ObjectStore> TransferPipeline<S> {
    /// Create a pipeline writing into `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Upload `event`, logging instead of returning any failure.
    ///
    /// Returns `true` if the object was written.
    pub async fn upload(&self, event: &FileEvent) -> bool {
        match self.try_upload(event).await {
            Ok(receipt) => {
                info!(
                    file = %receipt.key,
                    bytes = receipt.bytes,
                    container = %self.store.container(),
                    "Uploaded file"
                );
                true
            }
            Err(e) => {
                warn!(file = %event.name, error = %e, "Error uploading file");
                false
            }
        }
    }

    /// Upload `event` under its leaf name.
    ///
    /// An object with the same key is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read, or the store
    /// rejects the write. Nothing is retried.
    pub async fn try_upload(&self, event: &FileEvent) -> Result<UploadReceipt, TransferError> {
        let data = read_file(&event.full_path).await?;
        let bytes = u64::try_from(data.len()).unwrap_or(u64::MAX);

        self.store
            .put(&event.name, Bytes::from(data))
            .await
            .map_err(|e| TransferError::storage(&event.name, e))?;

        Ok(UploadReceipt {
            key: event.name.clone(),
            bytes,
        })
    }
}

/// Read the whole file. The handle is closed when it goes out of scope,
/// on success and on error alike.
async fn read_file(path: &Path) -> Result<Vec<u8>, TransferError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| TransferError::open(path, e))?;

    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .await
        .map_err(|e| TransferError::read(path, e))?;
    Ok(data)
}
