use async_trait::async_trait;

/// An object that can be used to get blobs.
#[async_trait]
pub trait BlobStorageProvider: Send + Sync {
    /// Returns the contents of `blob_name`, or `None` if it does not exist.
    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, std::io::Error>;

    /// A human-readable description of where blobs are read from (e.g. the bucket)
    fn container(&self) -> &str;
}

/// A [`BlobStorageProvider`] for local disk
pub struct LocalDisk;

#[async_trait]
impl BlobStorageProvider for LocalDisk {
    #[must_use]
    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        if std::path::Path::new(blob_name).try_exists()? {
            Ok(Some(std::fs::read(blob_name)?))
        } else {
            Ok(None)
        }
    }

    fn container(&self) -> &str {
        "local disk"
    }
}
