use crate::csv::DecodeError;
use crate::fs::BlobStorageProvider;
use crate::fs_s3::{self, ContainerClient};
use crate::{S3Config, Table};

/// The reason a fetch failed, as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The object (or its bucket) does not exist
    NotFound,
    /// The credentials were rejected or do not grant access to the object
    AccessDenied,
    /// Any other failure to get the object, e.g. the endpoint is unreachable
    Transport,
    /// The object exists but is not a valid table
    Decode,
}

#[derive(Debug)]
pub enum FetchError {
    /// The object does not exist
    NotFound { key: String },
    /// An error originating from trying to read from storage
    Storage {
        key: String,
        source: std::io::Error,
    },
    /// An error originating from decoding the object
    Decode { key: String, source: DecodeError },
}

impl FetchError {
    /// The key of the object that failed to be fetched
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key } | Self::Storage { key, .. } | Self::Decode { key, .. } => key,
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::NotFound { .. } => FetchErrorKind::NotFound,
            Self::Storage { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => FetchErrorKind::NotFound,
                std::io::ErrorKind::PermissionDenied => FetchErrorKind::AccessDenied,
                _ => FetchErrorKind::Transport,
            },
            Self::Decode { .. } => FetchErrorKind::Decode,
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Storage { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { key } => write!(f, "'{key}' does not exist"),
            Self::Storage { key, source } => write!(f, "could not read '{key}': {source}"),
            Self::Decode { key, source } => write!(f, "could not decode '{key}': {source}"),
        }
    }
}

/// Fetches CSV objects from a [`BlobStorageProvider`] (by default an S3 bucket) and
/// decodes them into [`Table`]s.
///
/// Each fetch sends exactly one request and holds no state between calls.
pub struct StorageFetcher<P = ContainerClient> {
    provider: P,
}

impl StorageFetcher<ContainerClient> {
    /// Initializes a [`StorageFetcher`] of the bucket in `config`.
    /// Credentials are not validated; invalid ones make every fetch fail.
    pub async fn new(config: S3Config) -> Self {
        Self::with_provider(fs_s3::client(config).await)
    }
}

impl<P: BlobStorageProvider> StorageFetcher<P> {
    pub fn with_provider(provider: P) -> Self {
        log::info!("Storage client for {} initialized", provider.container());
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetches `key` and decodes it as a CSV with a header.
    /// # Error
    /// Errors if the object does not exist, cannot be read, or is not a valid CSV
    pub async fn try_fetch_object(&self, key: &str) -> Result<Table, FetchError> {
        let data = self
            .provider
            .maybe_get(key)
            .await
            .map_err(|source| FetchError::Storage {
                key: key.to_string(),
                source,
            })?
            .ok_or_else(|| FetchError::NotFound {
                key: key.to_string(),
            })?;

        crate::csv::decode(&data).map_err(|source| FetchError::Decode {
            key: key.to_string(),
            source,
        })
    }

    /// Fetches `key` and decodes it as a CSV with a header.
    /// Returns `None` on any failure, which is logged. See [`Self::try_fetch_object`]
    /// to handle the failure.
    pub async fn fetch_object(&self, key: &str) -> Option<Table> {
        let container = self.provider.container();
        log::info!("Fetching '{key}' from {container}");
        match self.try_fetch_object(key).await {
            Ok(table) => {
                log::info!("Fetched '{key}' with {} records", table.num_rows());
                Some(table)
            }
            Err(e) => {
                log::error!("Failed to fetch '{key}' from {container}: {e}");
                None
            }
        }
    }
}
