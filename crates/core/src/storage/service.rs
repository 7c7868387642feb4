//! Storage service implementation using Apache OpenDAL.

use std::future::Future;

use bytes::Bytes;
use opendal::{Operator, services};

use super::config::StorageProvider;
use super::error::StorageError;

/// Write access to a single container.
///
/// The transfer pipeline only needs "store these bytes under this key";
/// everything else about the backend stays behind this trait.
pub trait ObjectStore: Send + Sync + 'static {
    /// Store `data` under `key`, replacing any existing object.
    fn put(
        &self,
        key: &str,
        data: Bytes,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Name of the container the store writes into.
    fn container(&self) -> &str;
}

/// Storage service bound to one container.
pub struct StorageService {
    operator: Operator,
    provider: StorageProvider,
}

impl StorageService {
    /// Create a new storage service from a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_provider(provider: StorageProvider) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&provider)?;
        Ok(Self { operator, provider })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::AzureBlob {
                endpoint,
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .endpoint(endpoint)
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(root);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory { .. } => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(operator)
    }

    /// Read an object back. Only tests read; the service itself is write-only.
    #[cfg(test)]
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(key).await.map_err(|e| {
            if e.kind() == opendal::ErrorKind::NotFound {
                StorageError::not_found(key)
            } else {
                StorageError::from(e)
            }
        })?;
        Ok(buffer.to_vec())
    }

    /// Check if an object exists in storage.
    #[cfg(test)]
    async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl ObjectStore for StorageService {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        self.operator
            .write(key, data)
            .await
            .map(|_| ())
            .map_err(StorageError::from)
    }

    fn container(&self) -> &str {
        self.provider.container()
    }
}
