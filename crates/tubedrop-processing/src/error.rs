//! Download errors

use std::path::PathBuf;
use thiserror::Error;
use tubedrop_container::ContainerError;
use tubedrop_core::AppError;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Image, setup, start, infrastructure or exit-code failure, passed through unchanged.
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("No downloaded file starts with token {token}")]
    ArtifactNotFound { token: String },

    #[error("Failed to list {}: {source}", .directory.display())]
    DirectoryListFailed {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DownloadResult<T> = Result<T, DownloadError>;

impl From<DownloadError> for AppError {
    fn from(err: DownloadError) -> Self {
        AppError::DownloadFailed(err.to_string())
    }
}
