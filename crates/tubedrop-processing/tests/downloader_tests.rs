//! Content downloader tests.
//!
//! Most tests drive `ContainerContentDownloader` with `FakeContainerClient`,
//! whose run hook plays youtube-dl: it expands the output template and writes
//! the file through the bind mount. The tests at the bottom need Docker and
//! network access and are ignored by default.

use std::io;
use std::path::Path;
use std::sync::Arc;
use tubedrop_container::{
    ContainerClient, ContainerError, ExecutionOutcome, FakeContainerClient, RecordedRun,
};
use tubedrop_core::constants::DEFAULT_DOWNLOADER_IMAGE;
use tubedrop_processing::{
    ContainerContentDownloader, ContentDownloader, DownloadError, DownloadOptions,
    MountDirectory, ScratchDir,
};

const AUDIO_ONLY: DownloadOptions = DownloadOptions { audio_only: true };

/// Stand-in for youtube-dl: expand `-o` and write the file on the host side.
fn fake_youtube_dl(run: &RecordedRun) -> io::Result<()> {
    let template = run
        .command
        .iter()
        .skip_while(|arg| arg.as_str() != "-o")
        .nth(1)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no output template"))?;
    let ext = if run.command.iter().any(|arg| arg == "-x") {
        "mp3"
    } else {
        "mp4"
    };
    let in_container = template
        .replace("%(title)s", "Some Video Title")
        .replace("%(ext)s", ext);
    let host_path = run
        .host_path_for(&in_container)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "template outside bind mount"))?;
    std::fs::write(host_path, b"media")
}

fn downloader(client: FakeContainerClient) -> (Arc<ScratchDir>, Arc<FakeContainerClient>, ContainerContentDownloader) {
    let scratch = Arc::new(ScratchDir::temporary().unwrap());
    let client = Arc::new(client);
    let downloader =
        ContainerContentDownloader::new(client.clone(), scratch.clone(), DEFAULT_DOWNLOADER_IMAGE);
    (scratch, client, downloader)
}

fn token_of(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy()[..8].to_string()
}

#[tokio::test]
async fn test_audio_download_resolves_mp3() {
    let (scratch, client, downloader) =
        downloader(FakeContainerClient::new().with_run_hook(fake_youtube_dl));

    let path = downloader
        .download_content("https://valid/video", &AUDIO_ONLY)
        .await
        .unwrap();

    assert_eq!(path.extension().unwrap(), "mp3");
    assert_eq!(path.parent().unwrap(), scratch.mount_directory());
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("-Some Video Title.mp3"));

    let runs = client.runs().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].image, DEFAULT_DOWNLOADER_IMAGE);
    assert_eq!(runs[0].command.last().unwrap(), "https://valid/video");
    assert_eq!(runs[0].options.bind_mounts.len(), 1);
    assert_eq!(runs[0].options.bind_mounts[0].host_path, scratch.mount_directory());
    assert_eq!(runs[0].options.bind_mounts[0].container_path, "/downloads");
    assert_eq!(runs[0].options.user, None);
}

#[tokio::test]
async fn test_video_download_keeps_container_extension() {
    let (_scratch, _client, downloader) =
        downloader(FakeContainerClient::new().with_run_hook(fake_youtube_dl));

    let path = downloader
        .download_content("https://valid/video", &DownloadOptions { audio_only: false })
        .await
        .unwrap();
    assert_eq!(path.extension().unwrap(), "mp4");
}

#[tokio::test]
async fn test_failing_tool_is_a_non_zero_exit() {
    let (scratch, _client, downloader) =
        downloader(FakeContainerClient::new().with_outcome(ExecutionOutcome::Completed(1)));

    let err = downloader
        .download_content("https://invalid/not-a-real-url", &AUDIO_ONLY)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::Container(ContainerError::ExecutionNonZeroExit { code: 1, .. })
    ));
    assert_eq!(std::fs::read_dir(scratch.mount_directory()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_successful_run_without_output_is_not_found() {
    let (_scratch, _client, downloader) = downloader(FakeContainerClient::new());

    let err = downloader
        .download_content("https://valid/video", &AUDIO_ONLY)
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::ArtifactNotFound { .. }));
}

#[tokio::test]
async fn test_unavailable_image_stops_before_running() {
    let (_scratch, client, downloader) =
        downloader(FakeContainerClient::new().with_failing_pulls());

    let err = downloader
        .download_content("https://valid/video", &AUDIO_ONLY)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::Container(ContainerError::ImageUnavailable { .. })
    ));
    assert!(client.runs().await.is_empty());
}

#[tokio::test]
async fn test_infrastructure_failure_passes_through() {
    let (_scratch, _client, downloader) = downloader(
        FakeContainerClient::new()
            .with_run_hook(fake_youtube_dl)
            .with_outcome(ExecutionOutcome::InfrastructureError("daemon went away".to_string())),
    );

    let err = downloader
        .download_content("https://valid/video", &AUDIO_ONLY)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DownloadError::Container(ContainerError::ExecutionInfrastructureFailed { .. })
    ));
}

#[tokio::test]
async fn test_concurrent_downloads_resolve_their_own_files() {
    let (_scratch, client, downloader) =
        downloader(FakeContainerClient::new().with_run_hook(fake_youtube_dl));

    let (first, second) = tokio::join!(
        downloader.download_content("https://valid/one", &AUDIO_ONLY),
        downloader.download_content("https://valid/two", &AUDIO_ONLY),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_ne!(first, second);
    let (first_token, second_token) = (token_of(&first), token_of(&second));
    assert_ne!(first_token, second_token);
    assert!(!first
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with(&second_token));
    assert!(!second
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with(&first_token));
    assert_eq!(client.runs().await.len(), 2);
}

#[tokio::test]
async fn test_best_effort_init_primes_image_once() {
    let (_scratch, client, downloader) =
        downloader(FakeContainerClient::new().with_run_hook(fake_youtube_dl));

    downloader.best_effort_init().await.unwrap();
    assert!(client.has_image(DEFAULT_DOWNLOADER_IMAGE).await);

    downloader
        .download_content("https://valid/video", &AUDIO_ONLY)
        .await
        .unwrap();
    assert_eq!(client.pull_calls(), 1);
    assert_eq!(client.inspect_calls(), 2);
}

#[tokio::test]
async fn test_best_effort_init_reports_failure() {
    let (_scratch, _client, downloader) =
        downloader(FakeContainerClient::new().with_failing_pulls());
    assert!(downloader.best_effort_init().await.is_err());
}

#[cfg(feature = "docker")]
mod docker {
    use super::*;

    // Replace with any short public video when this one disappears.
    const SHORT_VIDEO: &str = "https://www.youtube.com/watch?v=jNQXAC9IVRw";

    fn docker_downloader(scratch: Arc<ScratchDir>) -> ContainerContentDownloader {
        ContainerContentDownloader::with_docker(scratch, DEFAULT_DOWNLOADER_IMAGE).unwrap()
    }

    #[tokio::test]
    #[ignore = "requires Docker and network access"]
    async fn test_real_audio_download() {
        let scratch = Arc::new(ScratchDir::temporary().unwrap());
        let downloader = docker_downloader(scratch);
        let path = downloader
            .download_content(SHORT_VIDEO, &AUDIO_ONLY)
            .await
            .unwrap();
        assert_eq!(path.extension().unwrap(), "mp3");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_real_invalid_url_fails() {
        let scratch = Arc::new(ScratchDir::temporary().unwrap());
        let downloader = docker_downloader(scratch);
        let err = downloader
            .download_content("https://invalid/not-a-real-url", &AUDIO_ONLY)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::Container(ContainerError::ExecutionNonZeroExit { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_present_image_is_not_refetched() {
        let client = tubedrop_container::DockerClient::connect().unwrap();
        client
            .ensure_image_available(DEFAULT_DOWNLOADER_IMAGE)
            .await
            .unwrap();
        client
            .ensure_image_available(DEFAULT_DOWNLOADER_IMAGE)
            .await
            .unwrap();
    }
}
