//! Tubedrop Services
//!
//! Long-running pieces built on top of the processing and storage crates:
//! the download pipeline behind each request and the garbage collector that
//! expires published files.

pub mod cleanup;
pub mod pipeline;

pub use cleanup::GarbageCollector;
pub use pipeline::DownloadService;
