//! Content uploader
//!
//! Publishes a downloaded file under its own base name and returns a
//! time-limited link to it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tubedrop_core::constants::PRESIGNED_URL_TTL;
use tubedrop_core::AppError;
use tubedrop_storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Error accessing {} prior to upload: {source}", .path.display())]
    FileNotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Storage(e) => e.into(),
            other => AppError::UploadFailed(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ContentUploader: Send + Sync {
    /// Upload the file at `host_path` and return a public link to it.
    async fn upload_content_publicly(&self, host_path: &Path) -> Result<String, UploadError>;
}

pub struct RemoteStoreContentUploader {
    storage: Arc<dyn Storage>,
    link_ttl: Duration,
}

impl RemoteStoreContentUploader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            link_ttl: PRESIGNED_URL_TTL,
        }
    }

    /// Override how long returned links stay valid.
    pub fn with_link_ttl(mut self, link_ttl: Duration) -> Self {
        self.link_ttl = link_ttl;
        self
    }
}

#[async_trait]
impl ContentUploader for RemoteStoreContentUploader {
    #[tracing::instrument(skip(self), fields(backend = %self.storage.backend_type()))]
    async fn upload_content_publicly(&self, host_path: &Path) -> Result<String, UploadError> {
        tokio::fs::metadata(host_path)
            .await
            .map_err(|source| UploadError::FileNotAccessible {
                path: host_path.to_path_buf(),
                source,
            })?;

        let remote_name = host_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                StorageError::InvalidKey(format!("{} has no file name", host_path.display()))
            })?;

        self.storage.upload_file(host_path, &remote_name).await?;
        Ok(self
            .storage
            .get_presigned_url(&remote_name, self.link_ttl)
            .await?)
    }
}
