//! Artifact resolution by token.
//!
//! The downloading tool picks the final file name from the media title and
//! extension, so the only stable part is the token prefix the downloader put
//! in the output template.

use crate::error::{DownloadError, DownloadResult};
use std::path::{Path, PathBuf};

/// Find the file in `directory` whose name starts with `token`.
///
/// The listing is not recursive and is sorted by name; the first match wins.
pub async fn find_file_by_token(directory: &Path, token: &str) -> DownloadResult<PathBuf> {
    tracing::debug!(directory = %directory.display(), token = %token, "Identifying file using token");

    let list_failed = |source| DownloadError::DirectoryListFailed {
        directory: directory.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(directory).await.map_err(list_failed)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_failed)? {
        names.push(entry.file_name());
    }
    names.sort();

    names
        .into_iter()
        .find(|name| name.to_string_lossy().starts_with(token))
        .map(|name| directory.join(name))
        .ok_or_else(|| DownloadError::ArtifactNotFound {
            token: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubedrop_core::generate_random_string;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[tokio::test]
    async fn test_resolves_single_match() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..20 {
            let token = generate_random_string(8);
            let name = format!("{}-Some Title.mp3", token);
            touch(dir.path(), &name);
            let found = find_file_by_token(dir.path(), &token).await.unwrap();
            assert_eq!(found, dir.path().join(&name));
        }
    }

    #[tokio::test]
    async fn test_missing_token_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "aaaaaaaa-other.mp3");
        touch(dir.path(), "xbbbbbbbb-contains-token-later.mp3");

        let err = find_file_by_token(dir.path(), "bbbbbbbb").await.unwrap_err();
        assert!(matches!(err, DownloadError::ArtifactNotFound { ref token } if token == "bbbbbbbb"));
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_file_by_token(dir.path(), "abcdefgh").await.unwrap_err();
        assert!(matches!(err, DownloadError::ArtifactNotFound { .. }));
    }

    #[tokio::test]
    async fn test_first_match_in_name_order_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "abcdefgh-b.webm");
        touch(dir.path(), "abcdefgh-a.mp3");

        let found = find_file_by_token(dir.path(), "abcdefgh").await.unwrap();
        assert_eq!(found, dir.path().join("abcdefgh-a.mp3"));
    }

    #[tokio::test]
    async fn test_unreadable_directory_is_a_listing_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let err = find_file_by_token(&missing, "abcdefgh").await.unwrap_err();
        match err {
            DownloadError::DirectoryListFailed { directory, .. } => assert_eq!(directory, missing),
            other => panic!("expected DirectoryListFailed, got {:?}", other),
        }
    }
}
