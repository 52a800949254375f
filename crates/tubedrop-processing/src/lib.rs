//! Tubedrop Processing Library
//!
//! This crate turns a remote media URL into a local file and a local file into
//! a public link:
//!
//! - `downloader`: runs youtube-dl in a container and resolves its output
//! - `locator`: finds a file in the shared mount directory by token
//! - `scratch`: the shared mount directory itself
//! - `uploader`: publishes a local file through the remote store

pub mod downloader;
pub mod error;
pub mod locator;
pub mod scratch;
pub mod uploader;

// Re-export commonly used types
pub use downloader::{
    ContainerContentDownloader, ContentDownloader, DownloadOptions, FakeContentDownloader,
};
pub use error::{DownloadError, DownloadResult};
pub use locator::find_file_by_token;
pub use scratch::{MountDirectory, ScratchDir};
pub use uploader::{ContentUploader, RemoteStoreContentUploader, UploadError};
