use crate::keys::validate_remote_name;
use crate::traits::{RemoteFile, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::path::Path;
use std::time::Duration;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        // Credentials come from the usual AWS_* environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }

    /// Object key for a remote name. Names coming back from a listing are
    /// already encoded and parse as-is; anything else is encoded here.
    fn object_path(remote_name: &str) -> ObjectPath {
        ObjectPath::parse(remote_name).unwrap_or_else(|_| ObjectPath::from(remote_name))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> StorageResult<()> {
        validate_remote_name(remote_name)?;
        let data = tokio::fs::read(local_path).await?;
        let size = data.len() as u64;
        let location = Self::object_path(remote_name);

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put(&location, PutPayload::from(Bytes::from(data)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %location,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn get_presigned_url(
        &self,
        remote_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Self::object_path(remote_name);
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn list_all_uploaded_files(&self) -> StorageResult<Vec<RemoteFile>> {
        let start = std::time::Instant::now();

        let objects: Vec<_> = self.store.list(None).try_collect().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 listing failed"
            );
            StorageError::ListFailed(e.to_string())
        })?;

        tracing::debug!(
            bucket = %self.bucket,
            count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 listing successful"
        );

        Ok(objects
            .into_iter()
            .map(|meta| RemoteFile {
                path: meta.location.to_string(),
                last_modified: meta.last_modified,
            })
            .collect())
    }

    async fn delete_file(&self, remote_name: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Self::object_path(remote_name);

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %location,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
