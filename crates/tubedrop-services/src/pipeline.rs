//! Download pipeline: download → upload → link.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use tubedrop_core::AppError;
use tubedrop_processing::{ContentDownloader, ContentUploader, DownloadOptions};

/// Runs one download job end to end under a deadline.
#[derive(Clone)]
pub struct DownloadService {
    downloader: Arc<dyn ContentDownloader>,
    uploader: Arc<dyn ContentUploader>,
    timeout: Duration,
}

impl DownloadService {
    pub fn new(
        downloader: Arc<dyn ContentDownloader>,
        uploader: Arc<dyn ContentUploader>,
        timeout: Duration,
    ) -> Self {
        Self {
            downloader,
            uploader,
            timeout,
        }
    }

    /// Prime the downloader in the background. Failures are logged only.
    pub fn start_best_effort_init(&self) -> tokio::task::JoinHandle<()> {
        let downloader = self.downloader.clone();
        tokio::spawn(async move {
            tracing::info!("Starting best-effort downloader initialisation");
            match downloader.best_effort_init().await {
                Ok(()) => tracing::info!("Downloader initialised"),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Best-effort downloader initialisation failed, first download will be slower"
                ),
            }
        })
    }

    /// Download `remote_url`, publish the result and return its public link.
    ///
    /// The whole job is bounded by the configured timeout. A failed download
    /// is never followed by an upload. The scratch copy is removed whether or
    /// not the upload succeeds; a job that outlives its timeout keeps running
    /// in the background only to remove what it downloaded.
    #[tracing::instrument(skip(self), fields(timeout_secs = self.timeout.as_secs()))]
    pub async fn process(
        &self,
        remote_url: &str,
        options: DownloadOptions,
    ) -> Result<String, AppError> {
        let start = std::time::Instant::now();
        let abandoned = Arc::new(AtomicBool::new(false));

        let mut job = tokio::spawn({
            let service = self.clone();
            let remote_url = remote_url.to_string();
            let abandoned = abandoned.clone();
            async move { service.run(&remote_url, options, &abandoned).await }
                .instrument(tracing::Span::current())
        });

        let result = match tokio::time::timeout(self.timeout, &mut job).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(AppError::Internal(format!("Download job aborted: {}", e))),
            Err(_) => {
                abandoned.store(true, Ordering::SeqCst);
                Err(AppError::Timeout {
                    operation: format!("download of {}", remote_url),
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        match &result {
            Ok(_) => tracing::info!(
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Download job completed"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Download job failed"
            ),
        }

        result
    }

    async fn run(
        &self,
        remote_url: &str,
        options: DownloadOptions,
        abandoned: &AtomicBool,
    ) -> Result<String, AppError> {
        let local_path = self
            .downloader
            .download_content(remote_url, &options)
            .await?;
        tracing::debug!(path = %local_path.display(), "Content download completed");

        if abandoned.load(Ordering::SeqCst) {
            tracing::info!(path = %local_path.display(), "Download finished after its deadline, discarding");
            remove_local_copy(&local_path).await;
            return Err(AppError::Internal("download abandoned after timeout".to_string()));
        }

        let published = self.uploader.upload_content_publicly(&local_path).await;
        remove_local_copy(&local_path).await;

        let public_url = published?;
        tracing::debug!("Content upload completed");
        Ok(public_url)
    }
}

async fn remove_local_copy(local_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(local_path).await {
        tracing::warn!(error = %e, path = %local_path.display(), "Failed to remove local copy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubedrop_processing::{
        FakeContentDownloader, MountDirectory, RemoteStoreContentUploader, ScratchDir,
    };
    use tubedrop_storage::InMemoryStorage;

    #[tokio::test]
    async fn test_fake_pipeline_publishes_and_cleans_scratch() {
        let scratch = Arc::new(ScratchDir::temporary().unwrap());
        let storage = Arc::new(InMemoryStorage::new());
        let service = DownloadService::new(
            Arc::new(FakeContentDownloader::new(scratch.clone())),
            Arc::new(RemoteStoreContentUploader::new(storage.clone())),
            Duration::from_secs(5),
        );

        let url = service
            .process("https://example.com/v", DownloadOptions { audio_only: true })
            .await
            .unwrap();

        let names = storage.file_names().await;
        assert_eq!(names.len(), 1);
        assert!(url.starts_with(&format!("memory://{}", names[0])));
        assert_eq!(
            storage.contents(&names[0]).await.unwrap().as_ref(),
            b"hi everyone\n"
        );
        assert_eq!(
            std::fs::read_dir(scratch.mount_directory()).unwrap().count(),
            0
        );
    }
}
