//! Container client abstraction trait
//!
//! This module defines the `ContainerClient` trait that all container runtimes
//! must implement, together with the request types and errors they share.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Container operation errors
///
/// Each step of a run fails with its own variant so callers and logs can tell
/// a broken runtime apart from a job that ran and failed.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Failed to connect to container runtime: {0}")]
    Connection(String),

    #[error("Image {image} is unavailable: {reason}")]
    ImageUnavailable { image: String, reason: String },

    #[error("Failed to create container: {0}")]
    ExecutionSetupFailed(String),

    #[error("Failed to start container {container_id}: {reason}")]
    ExecutionStartFailed {
        container_id: String,
        reason: String,
    },

    #[error("Lost track of container {container_id}: {reason}")]
    ExecutionInfrastructureFailed {
        container_id: String,
        reason: String,
    },

    #[error("Container {container_id} finished with non-zero exit code {code}")]
    ExecutionNonZeroExit { container_id: String, code: i64 },
}

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// A host directory made visible inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub host_path: PathBuf,
    pub container_path: String,
}

impl BindMount {
    pub fn new(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
        }
    }

    /// Docker `Binds` entry: `{host}:{container}`.
    pub fn to_bind_spec(&self) -> String {
        format!("{}:{}", self.host_path.display(), self.container_path)
    }
}

impl fmt::Display for BindMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bind_spec())
    }
}

/// Options for running a container. Restricted to what the downloader needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContainerOptions {
    /// Order does not matter; duplicates are passed through as given.
    pub bind_mounts: Vec<BindMount>,
    /// User to run as. `None` or an empty string keeps the image default.
    pub user: Option<String>,
}

impl RunContainerOptions {
    pub fn with_bind_mount(mut self, mount: BindMount) -> Self {
        self.bind_mounts.push(mount);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// The user override, if one should be applied.
    pub fn effective_user(&self) -> Option<&str> {
        self.user.as_deref().filter(|u| !u.is_empty())
    }
}

/// Container client abstraction trait
///
/// Implementations drive one ephemeral container per `run_container` call:
/// create, start, wait, and let the runtime remove it on exit.
#[async_trait]
pub trait ContainerClient: Send + Sync {
    /// Make sure `image` can be used to run containers on this host.
    ///
    /// A local copy short-circuits the fetch. Calling this repeatedly with the
    /// same image is not an error. Fails with `ImageUnavailable` only when the
    /// image is neither present nor fetchable.
    async fn ensure_image_available(&self, image: &str) -> ContainerResult<()>;

    /// Run `command` in a fresh container of `image` and block until it stops.
    /// An empty `command` runs the image's default arguments.
    ///
    /// Returns `Ok(())` only when the process exits with code 0.
    async fn run_container(
        &self,
        image: &str,
        command: &[String],
        options: &RunContainerOptions,
    ) -> ContainerResult<()>;
}
