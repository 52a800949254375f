//! Tubedrop Core Library
//!
//! This crate provides configuration, error types and small shared helpers
//! used by every tubedrop component.

pub mod config;
pub mod constants;
pub mod error;
pub mod random;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, DownloaderBackend, DownloaderConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use random::generate_random_string;
pub use storage_types::StorageBackend;
