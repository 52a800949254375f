//! Tubedrop API Library
//!
//! This crate provides the HTTP handlers, the in-process download registry and
//! application setup for the `tubedrop` binary.

pub mod cli;
pub mod constants;
pub mod error;
mod handlers;
pub mod registry;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use registry::{DownloadRecord, DownloadRegistry, DownloadStatus};
pub use state::AppState;
