//! Remote name validation shared by all backends.

use crate::traits::{StorageError, StorageResult};
use std::path::{Component, Path};

/// Check that `remote_name` is a single, plain file name.
///
/// Downloaded titles may contain dots, spaces and unicode, so only the path
/// structure is checked: no separators, no `.`/`..`, no root.
pub fn validate_remote_name(remote_name: &str) -> StorageResult<()> {
    if remote_name.is_empty() {
        return Err(StorageError::InvalidKey("remote name is empty".to_string()));
    }

    let mut components = Path::new(remote_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !remote_name.contains(['/', '\\']) => Ok(()),
        _ => Err(StorageError::InvalidKey(format!(
            "remote name must be a plain file name: {}",
            remote_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_titles_with_dots() {
        assert!(validate_remote_name("abcdefgh-Wait... what.mp3").is_ok());
        assert!(validate_remote_name("abcdefgh-Überraschung.mp4").is_ok());
    }

    #[test]
    fn test_rejects_paths() {
        for name in ["", "..", ".", "/etc/passwd", "a/b.mp3", "../b.mp3", "a\\b"] {
            assert!(
                matches!(validate_remote_name(name), Err(StorageError::InvalidKey(_))),
                "{:?} should be rejected",
                name
            );
        }
    }
}
