//! Storage abstraction trait
//!
//! This module defines the Storage trait that all remote store backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tubedrop_core::constants::PRESIGNED_URL_TTL;
use tubedrop_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid remote name: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(name),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Config(msg),
            StorageError::UploadFailed(msg) => AppError::UploadFailed(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// A file held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Remote name, as passed to `upload_file`.
    pub path: String,
    pub last_modified: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// All remote store backends (S3, local directory, in-memory) implement this
/// trait, so the uploader and the garbage collector never see backend details.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store the file at `local_path` under `remote_name`, replacing any
    /// existing file with that name.
    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> StorageResult<()>;

    /// Generate a time-limited GET link for `remote_name`.
    async fn get_presigned_url(
        &self,
        remote_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Upload a file and return a link valid for `PRESIGNED_URL_TTL`.
    async fn upload_file_publicly(
        &self,
        local_path: &Path,
        remote_name: &str,
    ) -> StorageResult<String> {
        self.upload_file(local_path, remote_name).await?;
        self.get_presigned_url(remote_name, PRESIGNED_URL_TTL).await
    }

    /// Every file currently in the store.
    async fn list_all_uploaded_files(&self) -> StorageResult<Vec<RemoteFile>>;

    /// Delete `remote_name`. Deleting a file that does not exist is not an error.
    async fn delete_file(&self, remote_name: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(StorageError::NotFound("a.mp3".to_string())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::InvalidKey("../x".to_string())),
            AppError::InvalidInput(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::UploadFailed("denied".to_string())),
            AppError::UploadFailed(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::ListFailed("timeout".to_string())),
            AppError::Storage(_)
        ));
    }
}
