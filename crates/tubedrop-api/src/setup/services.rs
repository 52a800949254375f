//! Download pipeline wiring

use crate::registry::DownloadRegistry;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubedrop_core::{Config, DownloaderBackend};
use tubedrop_processing::{
    ContentDownloader, FakeContentDownloader, MountDirectory, RemoteStoreContentUploader,
    ScratchDir,
};
use tubedrop_services::DownloadService;
use tubedrop_storage::Storage;

fn setup_downloader(
    config: &Config,
    scratch: Arc<ScratchDir>,
) -> Result<Arc<dyn ContentDownloader>> {
    match config.downloader_backend() {
        #[cfg(feature = "docker")]
        DownloaderBackend::Container => {
            let downloader = tubedrop_processing::ContainerContentDownloader::with_docker(
                scratch,
                config.downloader_image(),
            )
            .context("Failed to connect to the Docker daemon")?;
            tracing::info!(image = %downloader.image(), "Using container downloader");
            Ok(Arc::new(downloader))
        }
        #[cfg(not(feature = "docker"))]
        DownloaderBackend::Container => Err(anyhow::anyhow!(
            "Container downloader not available (docker feature not enabled)"
        )),
        DownloaderBackend::Fake => {
            tracing::warn!("Using fake downloader, no media will actually be fetched");
            Ok(Arc::new(FakeContentDownloader::new(scratch)))
        }
    }
}

/// Build the download pipeline and the shared application state.
pub fn initialize_services(config: Config, storage: Arc<dyn Storage>) -> Result<Arc<AppState>> {
    let scratch = Arc::new(
        ScratchDir::from_config(config.scratch_dir())
            .context("Failed to prepare scratch directory")?,
    );
    tracing::info!(path = %scratch.mount_directory().display(), "Scratch directory ready");

    let downloader = setup_downloader(&config, scratch.clone())?;
    let uploader = Arc::new(
        RemoteStoreContentUploader::new(storage.clone())
            .with_link_ttl(config.presigned_url_ttl()),
    );
    let downloads = DownloadService::new(downloader, uploader, config.download_timeout());

    Ok(Arc::new(AppState {
        config,
        registry: Arc::new(DownloadRegistry::new()),
        downloads,
        storage,
        scratch,
    }))
}

