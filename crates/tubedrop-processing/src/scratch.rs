//! Shared mount directory.
//!
//! Downloads land here, bound into the worker container, before they are
//! published. The directory outlives individual jobs; tokens keep concurrent
//! jobs apart.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A host directory that jobs write into.
pub trait MountDirectory: Send + Sync {
    fn mount_directory(&self) -> &Path;

    fn path_for_file(&self, file_name: &str) -> PathBuf {
        self.mount_directory().join(file_name)
    }
}

/// Scratch directory owned by the server process.
#[derive(Debug)]
pub enum ScratchDir {
    /// Created under the system temp dir and removed on `clean_up` or drop.
    Temporary(TempDir),
    /// Supplied by configuration; never removed.
    Configured(PathBuf),
}

impl ScratchDir {
    pub fn temporary() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("tubedrop-").tempdir()?;
        tracing::debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(ScratchDir::Temporary(dir))
    }

    /// Use `path`, creating it if needed.
    pub fn configured(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        Ok(ScratchDir::Configured(path))
    }

    /// A configured directory when given, otherwise a temporary one.
    pub fn from_config(path: Option<&Path>) -> io::Result<Self> {
        match path {
            Some(path) => Self::configured(path),
            None => Self::temporary(),
        }
    }

    /// Remove the directory if this process created it.
    ///
    /// Jobs still holding the directory will fail to write into it afterwards.
    pub fn clean_up(&self) -> io::Result<()> {
        match self {
            ScratchDir::Temporary(dir) => {
                tracing::debug!(path = %dir.path().display(), "Removing scratch directory");
                match std::fs::remove_dir_all(dir.path()) {
                    Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                    _ => Ok(()),
                }
            }
            ScratchDir::Configured(_) => Ok(()),
        }
    }
}

impl MountDirectory for ScratchDir {
    fn mount_directory(&self) -> &Path {
        match self {
            ScratchDir::Temporary(dir) => dir.path(),
            ScratchDir::Configured(path) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_directory_is_removed_on_clean_up() {
        let scratch = ScratchDir::temporary().unwrap();
        let path = scratch.mount_directory().to_path_buf();
        assert!(path.is_dir());
        assert_eq!(scratch.path_for_file("a.mp3"), path.join("a.mp3"));

        scratch.clean_up().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_configured_directory_survives_clean_up() {
        let parent = tempfile::tempdir().unwrap();
        let path = parent.path().join("scratch");

        let scratch = ScratchDir::from_config(Some(&path)).unwrap();
        assert!(path.is_dir());
        scratch.clean_up().unwrap();
        assert!(path.is_dir());
    }
}
