//! In-memory container client for tests
//!
//! Records every call, answers with a canned outcome and can run a hook in
//! place of the container process, for example to write the file a real job
//! would have left in a bind mount.

use crate::completion::{completion_channel, ExecutionOutcome};
use crate::traits::{ContainerClient, ContainerError, ContainerResult, RunContainerOptions};
use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

type RunHook = Arc<dyn Fn(&RecordedRun) -> io::Result<()> + Send + Sync>;

/// One `run_container` call as the fake saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub container_id: String,
    pub image: String,
    pub command: Vec<String>,
    pub options: RunContainerOptions,
}

impl RecordedRun {
    /// Translate an in-container path to the host path it is bound to.
    ///
    /// Returns `None` when no bind mount covers `container_path`.
    pub fn host_path_for(&self, container_path: &str) -> Option<PathBuf> {
        self.options.bind_mounts.iter().find_map(|mount| {
            let rest = Path::new(container_path)
                .strip_prefix(&mount.container_path)
                .ok()?;
            Some(mount.host_path.join(rest))
        })
    }
}

/// Fake `ContainerClient`
pub struct FakeContainerClient {
    local_images: Mutex<HashSet<String>>,
    fail_pulls: bool,
    inspect_calls: AtomicUsize,
    pull_calls: AtomicUsize,
    setup_failure: Option<String>,
    outcome: ExecutionOutcome,
    run_hook: Option<RunHook>,
    runs: Mutex<Vec<RecordedRun>>,
}

impl Default for FakeContainerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeContainerClient {
    /// A client with no local images whose runs all exit with code 0.
    pub fn new() -> Self {
        Self {
            local_images: Mutex::new(HashSet::new()),
            fail_pulls: false,
            inspect_calls: AtomicUsize::new(0),
            pull_calls: AtomicUsize::new(0),
            setup_failure: None,
            outcome: ExecutionOutcome::Completed(0),
            run_hook: None,
            runs: Mutex::new(Vec::new()),
        }
    }

    /// Pretend `image` is already present locally.
    pub fn with_local_image(mut self, image: impl Into<String>) -> Self {
        self.local_images.get_mut().insert(image.into());
        self
    }

    /// Make every pull fail, so only pre-seeded images are available.
    pub fn with_failing_pulls(mut self) -> Self {
        self.fail_pulls = true;
        self
    }

    /// Make container creation fail with `reason`.
    pub fn with_setup_failure(mut self, reason: impl Into<String>) -> Self {
        self.setup_failure = Some(reason.into());
        self
    }

    /// Outcome reported for every run (after the hook, if any, succeeds).
    pub fn with_outcome(mut self, outcome: ExecutionOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Run `hook` in place of the container process. A hook error is reported
    /// as exit code 1.
    pub fn with_run_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RecordedRun) -> io::Result<()> + Send + Sync + 'static,
    {
        self.run_hook = Some(Arc::new(hook));
        self
    }

    pub fn inspect_calls(&self) -> usize {
        self.inspect_calls.load(Ordering::SeqCst)
    }

    pub fn pull_calls(&self) -> usize {
        self.pull_calls.load(Ordering::SeqCst)
    }

    pub async fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().await.clone()
    }

    pub async fn has_image(&self, image: &str) -> bool {
        self.local_images.lock().await.contains(image)
    }
}

#[async_trait]
impl ContainerClient for FakeContainerClient {
    async fn ensure_image_available(&self, image: &str) -> ContainerResult<()> {
        self.inspect_calls.fetch_add(1, Ordering::SeqCst);
        let mut images = self.local_images.lock().await;
        if images.contains(image) {
            return Ok(());
        }

        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pulls {
            return Err(ContainerError::ImageUnavailable {
                image: image.to_string(),
                reason: "image not present and pull refused".to_string(),
            });
        }

        tracing::debug!(image = %image, "Fake pull");
        images.insert(image.to_string());
        Ok(())
    }

    async fn run_container(
        &self,
        image: &str,
        command: &[String],
        options: &RunContainerOptions,
    ) -> ContainerResult<()> {
        if let Some(reason) = &self.setup_failure {
            return Err(ContainerError::ExecutionSetupFailed(reason.clone()));
        }

        let run = {
            let mut runs = self.runs.lock().await;
            let run = RecordedRun {
                container_id: format!("fake-{}", runs.len() + 1),
                image: image.to_string(),
                command: command.to_vec(),
                options: options.clone(),
            };
            runs.push(run.clone());
            run
        };

        let outcome = match &self.run_hook {
            Some(hook) => match hook(&run) {
                Ok(()) => self.outcome.clone(),
                Err(e) => {
                    tracing::debug!(container_id = %run.container_id, error = %e, "Fake run hook failed");
                    ExecutionOutcome::Completed(1)
                }
            },
            None => self.outcome.clone(),
        };

        let (senders, signals) = completion_channel();
        tokio::spawn(async move { senders.send(outcome) });
        signals.wait().await.into_result(&run.container_id)
    }
}
