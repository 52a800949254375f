//! Tubedrop Container Library
//!
//! This crate runs a single command inside an isolated, auto-removed container
//! and reports how it ended. It includes the `ContainerClient` trait, a Docker
//! implementation and an in-memory fake for tests.
//!
//! # Outcome classification
//!
//! A run ends through exactly one of two completion signals:
//!
//! - the **exit signal**, carrying the process exit code, or
//! - the **infrastructure signal**, raised when the runtime itself could not be
//!   observed (lost daemon connection, wait stream closed early).
//!
//! Exit code `0` is success, any other code is `ExecutionNonZeroExit`, and an
//! infrastructure signal is `ExecutionInfrastructureFailed` regardless of what
//! the process was doing. See the `completion` module.

pub mod completion;
#[cfg(feature = "docker")]
pub mod docker;
pub mod fake;
pub mod traits;

// Re-export commonly used types
pub use completion::{completion_channel, CompletionSenders, CompletionSignals, ExecutionOutcome};
#[cfg(feature = "docker")]
pub use docker::DockerClient;
pub use fake::{FakeContainerClient, RecordedRun};
pub use traits::{BindMount, ContainerClient, ContainerError, ContainerResult, RunContainerOptions};
