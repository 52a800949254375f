//! Tubedrop Storage Library
//!
//! This crate provides the remote store that downloaded files are published
//! to. It includes the `Storage` trait and implementations for S3, a local
//! directory ("local bucket mode") and an in-memory store for tests.
//!
//! # Remote names
//!
//! Files are stored flat under their remote name, which is the base name of
//! the downloaded file. Names must be a single relative path component; see
//! the `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::InMemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{RemoteFile, Storage, StorageError, StorageResult};
pub use tubedrop_core::StorageBackend;
