//! Storage provider configuration.

use blobdrop_shared::{StorageKind, StorageSettings};

use super::error::StorageError;

/// Well-known Azurite account used by `UseDevelopmentStorage=true`.
const DEV_STORAGE_ACCOUNT: &str = "devstoreaccount1";
const DEV_STORAGE_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_STORAGE_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Storage provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// Azure Blob Storage
    AzureBlob {
        /// Blob service endpoint, e.g. `https://acme.blob.core.windows.net`.
        endpoint: String,
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// S3-compatible storage: Cloudflare R2, AWS S3, MinIO
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: String,
    },
    /// In-process memory, lost on exit
    Memory {
        /// Logical container name, only used in logs.
        container: String,
    },
}

impl StorageProvider {
    /// Create an Azure Blob provider from a storage connection string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the connection string lacks the
    /// account name or key.
    pub fn azure_connection_string(
        connection_string: &str,
        container: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let parsed = AzureConnectionString::parse(connection_string)?;
        Ok(Self::AzureBlob {
            endpoint: parsed.endpoint,
            account: parsed.account,
            access_key: parsed.access_key,
            container: container.into(),
        })
    }

    /// Create Azure Blob Storage provider for the public cloud endpoint.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        let account = account.into();
        Self::AzureBlob {
            endpoint: format!("https://{account}.blob.core.windows.net"),
            account,
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<String>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Create in-memory provider.
    #[must_use]
    pub fn memory(container: impl Into<String>) -> Self {
        Self::Memory {
            container: container.into(),
        }
    }

    /// Build a provider from the raw configuration section.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a field required by the selected
    /// backend is missing.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        match settings.provider {
            StorageKind::Azure => {
                let container = required(Some(&settings.container), "storage.container")?;
                if let Some(connection_string) = settings.connection_string.as_deref() {
                    return Self::azure_connection_string(connection_string, container);
                }

                let account = required(settings.account.as_ref(), "storage.account")?;
                let access_key = required(settings.access_key.as_ref(), "storage.access_key")?;
                let mut provider = Self::azure_blob(account, access_key, container);
                if let (Self::AzureBlob { endpoint, .. }, Some(custom)) =
                    (&mut provider, settings.endpoint.as_ref())
                {
                    endpoint.clone_from(custom);
                }
                Ok(provider)
            }
            StorageKind::S3 => Ok(Self::s3(
                required(settings.endpoint.as_ref(), "storage.endpoint")?,
                required(Some(&settings.container), "storage.container")?,
                required(settings.access_key_id.as_ref(), "storage.access_key_id")?,
                required(settings.access_key.as_ref(), "storage.access_key")?,
                settings.region.clone().unwrap_or_else(|| "auto".to_string()),
            )),
            StorageKind::Fs => {
                let root = settings
                    .root
                    .as_deref()
                    .ok_or_else(|| StorageError::configuration("storage.root is required"))?;
                let root = root.to_str().ok_or_else(|| {
                    StorageError::configuration("storage.root must be valid UTF-8")
                })?;
                Ok(Self::local_fs(root))
            }
            StorageKind::Memory => Ok(Self::memory(settings.container.clone())),
        }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AzureBlob { .. } => "azure_blob",
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
            Self::Memory { .. } => "memory",
        }
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn container(&self) -> &str {
        match self {
            Self::AzureBlob { container, .. } | Self::Memory { container } => container,
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root,
        }
    }
}

fn required(value: Option<&String>, key: &str) -> Result<String, StorageError> {
    value
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| StorageError::configuration(format!("{key} is required")))
}

/// Fields extracted from an Azure storage connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureConnectionString {
    /// Blob service endpoint.
    pub endpoint: String,
    /// Storage account name.
    pub account: String,
    /// Storage account key.
    pub access_key: String,
}

impl AzureConnectionString {
    /// Parse `Key=Value;Key=Value` pairs.
    ///
    /// Keys are case-insensitive. `BlobEndpoint` wins over the endpoint
    /// derived from `DefaultEndpointsProtocol`, `AccountName` and
    /// `EndpointSuffix`. `UseDevelopmentStorage=true` maps to the local
    /// Azurite emulator.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a segment has no `=` or the account
    /// name or key is missing.
    pub fn parse(connection_string: &str) -> Result<Self, StorageError> {
        let mut protocol = None;
        let mut account = None;
        let mut access_key = None;
        let mut suffix = None;
        let mut blob_endpoint = None;
        let mut development = false;

        for segment in connection_string.split(';').map(str::trim) {
            if segment.is_empty() {
                continue;
            }
            // Account keys are base64 and end in '=', so only split once.
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                StorageError::configuration(format!(
                    "malformed connection string segment '{segment}'"
                ))
            })?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "defaultendpointsprotocol" => protocol = Some(value),
                "accountname" => account = Some(value),
                "accountkey" => access_key = Some(value),
                "endpointsuffix" => suffix = Some(value),
                "blobendpoint" => blob_endpoint = Some(value),
                "usedevelopmentstorage" => development = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if development {
            return Ok(Self {
                endpoint: DEV_STORAGE_ENDPOINT.to_string(),
                account: DEV_STORAGE_ACCOUNT.to_string(),
                access_key: DEV_STORAGE_KEY.to_string(),
            });
        }

        let account = account
            .ok_or_else(|| StorageError::configuration("connection string has no AccountName"))?;
        let access_key = access_key
            .ok_or_else(|| StorageError::configuration("connection string has no AccountKey"))?;
        let endpoint = blob_endpoint.map_or_else(
            || {
                format!(
                    "{}://{}.blob.{}",
                    protocol.as_deref().unwrap_or("https"),
                    account,
                    suffix.as_deref().unwrap_or("core.windows.net"),
                )
            },
            |e| e.trim_end_matches('/').to_string(),
        );

        Ok(Self {
            endpoint,
            account,
            access_key,
        })
    }
}
