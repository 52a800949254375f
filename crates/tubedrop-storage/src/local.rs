use crate::keys::validate_remote_name;
use crate::traits::{RemoteFile, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Local filesystem storage implementation
///
/// Publishes files into a directory that the HTTP server exposes under
/// `base_url`. Links do not expire; `expires_in` is accepted and ignored.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory the files are copied into (created if missing)
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Directory holding the published files.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn name_to_path(&self, remote_name: &str) -> StorageResult<PathBuf> {
        validate_remote_name(remote_name)?;
        Ok(self.base_path.join(remote_name))
    }

    /// Generate public URL for file
    fn generate_url(&self, remote_name: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(remote_name)
        )
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> StorageResult<()> {
        let path = self.name_to_path(remote_name)?;
        let start = std::time::Instant::now();

        let size = fs::copy(local_path, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                local_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %remote_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn get_presigned_url(
        &self,
        remote_name: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        self.name_to_path(remote_name)?;
        Ok(self.generate_url(remote_name))
    }

    async fn list_all_uploaded_files(&self) -> StorageResult<Vec<RemoteFile>> {
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            files.push(RemoteFile {
                path: entry.file_name().to_string_lossy().into_owned(),
                last_modified: DateTime::<Utc>::from(metadata.modified()?),
            });
        }

        Ok(files)
    }

    async fn delete_file(&self, remote_name: &str) -> StorageResult<()> {
        let path = self.name_to_path(remote_name)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %remote_name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
