//! In-memory storage
//!
//! Keeps uploaded files in insertion order. Used by tests and by the server's
//! `memory` backend, which publishes nothing outside the process.

use crate::keys::validate_remote_name;
use crate::traits::{RemoteFile, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeDelta, Utc};
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredFile {
    file: RemoteFile,
    data: Bytes,
}

/// In-memory storage implementation
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    files: RwLock<Vec<StoredFile>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file that was uploaded `age` ago, without going through `upload_file`.
    pub async fn seed_file(&self, remote_name: impl Into<String>, age: TimeDelta) {
        let stored = StoredFile {
            file: RemoteFile {
                path: remote_name.into(),
                last_modified: Utc::now() - age,
            },
            data: Bytes::new(),
        };
        Self::insert(&mut *self.files.write().await, stored);
    }

    /// Remote names in insertion order.
    pub async fn file_names(&self) -> Vec<String> {
        self.files
            .read()
            .await
            .iter()
            .map(|stored| stored.file.path.clone())
            .collect()
    }

    pub async fn contents(&self, remote_name: &str) -> Option<Bytes> {
        self.files
            .read()
            .await
            .iter()
            .find(|stored| stored.file.path == remote_name)
            .map(|stored| stored.data.clone())
    }

    /// Replace in place when the name exists so ordering stays stable.
    fn insert(files: &mut Vec<StoredFile>, stored: StoredFile) {
        match files.iter_mut().find(|s| s.file.path == stored.file.path) {
            Some(existing) => *existing = stored,
            None => files.push(stored),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> StorageResult<()> {
        validate_remote_name(remote_name)?;
        let data = tokio::fs::read(local_path).await?;
        tracing::debug!(key = %remote_name, size_bytes = data.len(), "In-memory upload");

        let stored = StoredFile {
            file: RemoteFile {
                path: remote_name.to_string(),
                last_modified: Utc::now(),
            },
            data: Bytes::from(data),
        };
        Self::insert(&mut *self.files.write().await, stored);
        Ok(())
    }

    async fn get_presigned_url(
        &self,
        remote_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let files = self.files.read().await;
        if !files.iter().any(|stored| stored.file.path == remote_name) {
            return Err(StorageError::NotFound(remote_name.to_string()));
        }
        Ok(format!(
            "memory://{}?expires_in={}",
            urlencoding::encode(remote_name),
            expires_in.as_secs()
        ))
    }

    async fn list_all_uploaded_files(&self) -> StorageResult<Vec<RemoteFile>> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .map(|stored| stored.file.clone())
            .collect())
    }

    async fn delete_file(&self, remote_name: &str) -> StorageResult<()> {
        self.files
            .write()
            .await
            .retain(|stored| stored.file.path != remote_name);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
