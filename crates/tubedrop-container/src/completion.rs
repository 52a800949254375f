//! Completion signals for a running container.
//!
//! A backend hands the waiting side two one-shot receivers: one for the exit
//! code and one for an infrastructure failure. Only one of them fires for a
//! given run; whichever arrives first decides the outcome. If both could fire
//! the winner is whichever `select!` polls first, which is unspecified.

use tokio::sync::oneshot;

use crate::traits::{ContainerError, ContainerResult};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The process exited with this code.
    Completed(i64),
    /// The runtime could not be observed; the process state is unknown.
    InfrastructureError(String),
}

impl ExecutionOutcome {
    /// Classify the outcome for the container `container_id`.
    pub fn into_result(self, container_id: &str) -> ContainerResult<()> {
        match self {
            ExecutionOutcome::Completed(0) => Ok(()),
            ExecutionOutcome::Completed(code) => Err(ContainerError::ExecutionNonZeroExit {
                container_id: container_id.to_string(),
                code,
            }),
            ExecutionOutcome::InfrastructureError(reason) => {
                Err(ContainerError::ExecutionInfrastructureFailed {
                    container_id: container_id.to_string(),
                    reason,
                })
            }
        }
    }
}

/// Sending half, owned by whatever watches the container.
#[derive(Debug)]
pub struct CompletionSenders {
    pub exit: oneshot::Sender<i64>,
    pub infrastructure: oneshot::Sender<String>,
}

impl CompletionSenders {
    /// Report the process exit code. Consumes both senders so nothing else can fire.
    pub fn exited(self, code: i64) {
        let _ = self.exit.send(code);
    }

    /// Report that the runtime could not be observed.
    pub fn infrastructure_failed(self, reason: impl Into<String>) {
        let _ = self.infrastructure.send(reason.into());
    }

    pub fn send(self, outcome: ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Completed(code) => self.exited(code),
            ExecutionOutcome::InfrastructureError(reason) => self.infrastructure_failed(reason),
        }
    }
}

/// Receiving half, awaited by `run_container`.
#[derive(Debug)]
pub struct CompletionSignals {
    pub exit: oneshot::Receiver<i64>,
    pub infrastructure: oneshot::Receiver<String>,
}

impl CompletionSignals {
    /// Wait for the first signal to fire.
    ///
    /// A sender dropped without sending disables its branch. If both are
    /// dropped the watcher died without reporting, which counts as an
    /// infrastructure failure.
    pub async fn wait(self) -> ExecutionOutcome {
        let CompletionSignals {
            exit,
            infrastructure,
        } = self;

        tokio::select! {
            Ok(reason) = infrastructure => ExecutionOutcome::InfrastructureError(reason),
            Ok(code) = exit => ExecutionOutcome::Completed(code),
            else => ExecutionOutcome::InfrastructureError(
                "container watcher stopped without reporting a result".to_string(),
            ),
        }
    }
}

/// Create a linked pair of completion senders and signals.
pub fn completion_channel() -> (CompletionSenders, CompletionSignals) {
    let (exit_tx, exit_rx) = oneshot::channel();
    let (infra_tx, infra_rx) = oneshot::channel();
    (
        CompletionSenders {
            exit: exit_tx,
            infrastructure: infra_tx,
        },
        CompletionSignals {
            exit: exit_rx,
            infrastructure: infra_rx,
        },
    )
}
