//! Content downloaders
//!
//! `ContainerContentDownloader` runs youtube-dl in a throwaway container with
//! the scratch directory bound at `/downloads`, then finds the result by the
//! token it put in the output template. `FakeContentDownloader` writes a
//! placeholder file instead, for running the server without Docker.

use crate::error::DownloadResult;
use crate::locator::find_file_by_token;
use crate::scratch::MountDirectory;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tubedrop_container::{BindMount, ContainerClient, RunContainerOptions};
use tubedrop_core::constants::{
    CONTAINER_DOWNLOAD_DIRECTORY, DEFAULT_AUDIO_FORMAT, OUTPUT_TOKEN_LENGTH,
    RANDOM_FILE_NAME_LENGTH,
};
use tubedrop_core::generate_random_string;

/// Contents of the file the fake downloader produces.
pub const FAKE_DOWNLOAD_CONTENTS: &[u8] = b"hi everyone\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Extract the audio track as mp3 instead of keeping the video.
    pub audio_only: bool,
}

#[async_trait]
pub trait ContentDownloader: Send + Sync {
    /// Download `remote_url` into the mount directory and return the host path
    /// of the resulting file.
    async fn download_content(
        &self,
        remote_url: &str,
        options: &DownloadOptions,
    ) -> DownloadResult<PathBuf>;

    /// Work that makes the first download faster. Failing here is not fatal.
    async fn best_effort_init(&self) -> DownloadResult<()>;
}

/// youtube-dl output template for `token`, as seen inside the container.
pub fn output_template(token: &str) -> String {
    format!(
        "{}/{}-%(title)s.%(ext)s",
        CONTAINER_DOWNLOAD_DIRECTORY, token
    )
}

/// youtube-dl arguments for one download.
pub fn build_command(token: &str, remote_url: &str, options: &DownloadOptions) -> Vec<String> {
    let mut command = Vec::with_capacity(6);
    if options.audio_only {
        command.extend([
            "-x".to_string(),
            "--audio-format".to_string(),
            DEFAULT_AUDIO_FORMAT.to_string(),
        ]);
    }
    command.extend([
        "-o".to_string(),
        output_template(token),
        remote_url.to_string(),
    ]);
    command
}

/// Downloads with youtube-dl running in a container.
pub struct ContainerContentDownloader {
    container_client: Arc<dyn ContainerClient>,
    mount: Arc<dyn MountDirectory>,
    image: String,
}

impl ContainerContentDownloader {
    pub fn new(
        container_client: Arc<dyn ContainerClient>,
        mount: Arc<dyn MountDirectory>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            container_client,
            mount,
            image: image.into(),
        }
    }

    /// Downloader backed by the local Docker daemon.
    #[cfg(feature = "docker")]
    pub fn with_docker(
        mount: Arc<dyn MountDirectory>,
        image: impl Into<String>,
    ) -> DownloadResult<Self> {
        let client = tubedrop_container::DockerClient::connect()?;
        Ok(Self::new(Arc::new(client), mount, image))
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}

#[async_trait]
impl ContentDownloader for ContainerContentDownloader {
    #[tracing::instrument(skip(self), fields(image = %self.image))]
    async fn download_content(
        &self,
        remote_url: &str,
        options: &DownloadOptions,
    ) -> DownloadResult<PathBuf> {
        // Normally a no-op: startup already primed the image.
        self.container_client
            .ensure_image_available(&self.image)
            .await?;

        let token = generate_random_string(OUTPUT_TOKEN_LENGTH);
        let command = build_command(&token, remote_url, options);
        tracing::debug!(token = %token, command = ?command, "Issuing youtube-dl arguments");

        let run_options = RunContainerOptions::default().with_bind_mount(BindMount::new(
            self.mount.mount_directory(),
            CONTAINER_DOWNLOAD_DIRECTORY,
        ));

        self.container_client
            .run_container(&self.image, &command, &run_options)
            .await?;

        let path = find_file_by_token(self.mount.mount_directory(), &token).await?;
        tracing::info!(token = %token, path = %path.display(), "Download complete");
        Ok(path)
    }

    async fn best_effort_init(&self) -> DownloadResult<()> {
        self.container_client
            .ensure_image_available(&self.image)
            .await?;
        Ok(())
    }
}

/// Writes a small placeholder file with a random name.
pub struct FakeContentDownloader {
    mount: Arc<dyn MountDirectory>,
}

impl FakeContentDownloader {
    pub fn new(mount: Arc<dyn MountDirectory>) -> Self {
        Self { mount }
    }
}

#[async_trait]
impl ContentDownloader for FakeContentDownloader {
    async fn download_content(
        &self,
        remote_url: &str,
        _options: &DownloadOptions,
    ) -> DownloadResult<PathBuf> {
        let path = self
            .mount
            .path_for_file(&generate_random_string(RANDOM_FILE_NAME_LENGTH));
        tracing::debug!(remote_url = %remote_url, path = %path.display(), "Fake download");
        tokio::fs::write(&path, FAKE_DOWNLOAD_CONTENTS).await?;
        Ok(path)
    }

    async fn best_effort_init(&self) -> DownloadResult<()> {
        Ok(())
    }
}
