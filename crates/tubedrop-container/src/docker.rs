use crate::completion::{completion_channel, CompletionSignals, ExecutionOutcome};
use crate::traits::{ContainerClient, ContainerError, ContainerResult, RunContainerOptions};
use async_trait::async_trait;
use bollard::container::{
    Config, RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerWaitResponse, HostConfig};
use bollard::Docker;
use futures::StreamExt;

/// Docker implementation of `ContainerClient`, backed by the bollard SDK.
#[derive(Clone)]
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect using the local defaults (`DOCKER_HOST` or the Unix socket).
    pub fn connect() -> ContainerResult<Self> {
        tracing::debug!("Creating docker client");
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| ContainerError::Connection(e.to_string()))?;
        Ok(Self { docker })
    }

    pub fn from_docker(docker: Docker) -> Self {
        Self { docker }
    }

    fn build_container_config(
        image: &str,
        command: &[String],
        options: &RunContainerOptions,
    ) -> Config<String> {
        let binds = if options.bind_mounts.is_empty() {
            None
        } else {
            Some(
                options
                    .bind_mounts
                    .iter()
                    .map(|mount| mount.to_bind_spec())
                    .collect(),
            )
        };

        // Removed by `remove_container` once the exit code has been read.
        Config {
            image: Some(image.to_string()),
            cmd: Some(command.to_vec()),
            user: options.effective_user().map(String::from),
            host_config: Some(HostConfig {
                auto_remove: Some(false),
                binds,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Watch the container until it stops, then remove it and report
    /// through the completion signals.
    ///
    /// The container is not auto-removed by the daemon, so a wait issued
    /// after a fast exit still finds it and reads its exit code.
    fn watch_container(&self, container_id: &str) -> CompletionSignals {
        let (senders, signals) = completion_channel();
        let client = self.clone();
        let container_id = container_id.to_string();

        tokio::spawn(async move {
            let options = WaitContainerOptions {
                condition: "not-running".to_string(),
            };
            let mut stream = client.docker.wait_container(&container_id, Some(options));
            let outcome = outcome_from_wait(stream.next().await);
            drop(stream);

            client.remove_container(&container_id).await;
            senders.send(outcome);
        });

        signals
    }

    /// Force-remove a finished or failed container. Failures are logged only.
    async fn remove_container(&self, container_id: &str) {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        match self.docker.remove_container(container_id, Some(options)).await {
            Ok(()) => tracing::debug!(container_id = %container_id, "Container removed"),
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => {}
            Err(e) => tracing::warn!(
                container_id = %container_id,
                error = %e,
                "Failed to remove container"
            ),
        }
    }
}

/// Map the first item of a wait stream onto an outcome.
///
/// bollard reports a non-zero exit as a `DockerContainerWaitError` carrying
/// the code; that is still a process exit, not a runtime failure.
fn outcome_from_wait(
    item: Option<Result<ContainerWaitResponse, BollardError>>,
) -> ExecutionOutcome {
    match item {
        Some(Ok(response)) => ExecutionOutcome::Completed(response.status_code),
        Some(Err(BollardError::DockerContainerWaitError { code, .. })) => {
            ExecutionOutcome::Completed(code)
        }
        Some(Err(e)) => ExecutionOutcome::InfrastructureError(e.to_string()),
        None => ExecutionOutcome::InfrastructureError(
            "wait stream ended before the container stopped".to_string(),
        ),
    }
}

#[async_trait]
impl ContainerClient for DockerClient {
    async fn ensure_image_available(&self, image: &str) -> ContainerResult<()> {
        tracing::debug!(image = %image, "Ensuring image exists on host");

        let inspect_error = match self.docker.inspect_image(image).await {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };

        tracing::info!(image = %image, reason = %inspect_error, "Pulling image onto host");
        let start = std::time::Instant::now();

        let mut stream = self.docker.create_image(
            Some(CreateImageOptions {
                from_image: image,
                ..Default::default()
            }),
            None,
            None,
        );

        // The pull only completes once the progress stream is drained.
        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| {
                tracing::error!(
                    error = %e,
                    image = %image,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Image pull failed"
                );
                ContainerError::ImageUnavailable {
                    image: image.to_string(),
                    reason: format!("inspect failed ({}), pull failed ({})", inspect_error, e),
                }
            })?;
            if let Some(status) = info.status {
                tracing::trace!(image = %image, status = %status, "Pull progress");
            }
        }

        tracing::info!(
            image = %image,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image pulled successfully"
        );
        Ok(())
    }

    async fn run_container(
        &self,
        image: &str,
        command: &[String],
        options: &RunContainerOptions,
    ) -> ContainerResult<()> {
        tracing::debug!(
            image = %image,
            command = ?command,
            options = ?options,
            "Running container"
        );

        let config = Self::build_container_config(image, command, options);
        let created = self
            .docker
            .create_container::<String, String>(None, config)
            .await
            .map_err(|e| ContainerError::ExecutionSetupFailed(e.to_string()))?;
        let container_id = created.id;

        for warning in &created.warnings {
            tracing::warn!(container_id = %container_id, warning = %warning, "Container created with warning");
        }

        tracing::debug!(container_id = %container_id, "Starting container");
        if let Err(e) = self
            .docker
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await
        {
            self.remove_container(&container_id).await;
            return Err(ContainerError::ExecutionStartFailed {
                container_id,
                reason: e.to_string(),
            });
        }

        let start = std::time::Instant::now();
        tracing::debug!(container_id = %container_id, "Waiting for container to finish executing");
        let outcome = self.watch_container(&container_id).wait().await;

        tracing::debug!(
            container_id = %container_id,
            outcome = ?outcome,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "No longer waiting on container"
        );

        outcome.into_result(&container_id)
    }
}
