//! Configuration module
//!
//! This module provides configuration structures for the server and the
//! download pipeline: storage, worker image, scratch directory and timings.
//! Values come from the environment (after loading `.env`) and may be
//! overridden by command line flags in the binary.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_DOWNLOADER_IMAGE, PRESIGNED_URL_TTL};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8080;
const AWS_REGION: &str = "us-east-1";
const DOWNLOAD_TIMEOUT_SECS: u64 = 900;
const GC_INTERVAL_SECS: u64 = 3600;
const GC_MAX_AGE_HOURS: u64 = 24;
const SECS_PER_HOUR: u64 = 60 * 60;

/// Which content downloader the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloaderBackend {
    /// youtube-dl inside a Docker container.
    Container,
    /// Writes a placeholder file; no Docker required.
    Fake,
}

impl FromStr for DownloaderBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "container" | "docker" => Ok(DownloaderBackend::Container),
            "fake" => Ok(DownloaderBackend::Fake),
            _ => Err(anyhow::anyhow!("Invalid downloader backend: {}", s)),
        }
    }
}

/// Server level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
}

/// Download pipeline configuration
#[derive(Clone, Debug)]
pub struct DownloaderConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub presigned_url_ttl_secs: u64,
    // Downloader configuration
    pub downloader_backend: DownloaderBackend,
    pub downloader_image: String,
    pub scratch_dir: Option<PathBuf>,
    pub download_timeout_secs: u64,
    // Garbage collection
    /// Seconds between garbage collection sweeps. 0 = disabled.
    pub gc_interval_secs: u64,
    pub gc_max_age_hours: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<DownloaderConfig>);

impl Config {
    fn inner(&self) -> &DownloaderConfig {
        &self.0
    }

    fn inner_mut(&mut self) -> &mut DownloaderConfig {
        &mut self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map instead of
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = DownloaderConfig::from_lookup(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Overrides applied by command line flags

    pub fn set_server_port(&mut self, port: u16) {
        self.inner_mut().base.server_port = port;
    }

    pub fn set_storage_backend(&mut self, backend: StorageBackend) {
        self.inner_mut().storage_backend = backend;
    }

    pub fn set_s3_bucket(&mut self, bucket: String) {
        self.inner_mut().s3_bucket = Some(bucket);
    }

    /// Local bucket mode: publish into a directory under the system temp dir
    /// unless a path was configured explicitly.
    pub fn use_local_storage(&mut self) {
        let inner = self.inner_mut();
        inner.storage_backend = StorageBackend::Local;
        if inner.local_storage_path.is_none() {
            inner.local_storage_path = Some(
                env::temp_dir()
                    .join("tubedrop-local-bucket")
                    .to_string_lossy()
                    .into_owned(),
            );
        }
    }

    // Convenience getters for common fields

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> &str {
        &self.inner().s3_region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    /// `LOCAL_STORAGE_BASE_URL`, or this server's `/files` on the final port.
    pub fn local_storage_base_url(&self) -> String {
        self.inner()
            .local_storage_base_url
            .clone()
            .unwrap_or_else(|| default_local_base_url(self.server_port()))
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().presigned_url_ttl_secs)
    }

    pub fn downloader_backend(&self) -> DownloaderBackend {
        self.inner().downloader_backend
    }

    pub fn downloader_image(&self) -> &str {
        &self.inner().downloader_image
    }

    pub fn scratch_dir(&self) -> Option<&std::path::Path> {
        self.inner().scratch_dir.as_deref()
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().download_timeout_secs)
    }

    pub fn gc_interval(&self) -> Option<Duration> {
        match self.inner().gc_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn gc_max_age(&self) -> Duration {
        Duration::from_secs(self.inner().gc_max_age_hours.saturating_mul(SECS_PER_HOUR))
    }
}

fn default_local_base_url(port: u16) -> String {
    format!("http://localhost:{}/files", port)
}

/// Parse `value` when present; a malformed value is an error, not the default.
fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, anyhow::Error> {
    match value {
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", key, s)),
        None => Ok(default),
    }
}

impl DownloaderConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match non_empty("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let base = BaseConfig {
            server_port,
            environment,
        };

        let storage_backend = match non_empty("STORAGE_BACKEND") {
            Some(s) => s.parse()?,
            None => StorageBackend::S3,
        };

        let downloader_backend = match non_empty("DOWNLOADER_BACKEND") {
            Some(s) => s.parse()?,
            None => DownloaderBackend::Container,
        };


        let config = DownloaderConfig {
            base,
            storage_backend,
            s3_bucket: non_empty("S3_BUCKET"),
            s3_region: non_empty("S3_REGION")
                .or_else(|| non_empty("AWS_REGION"))
                .unwrap_or_else(|| AWS_REGION.to_string()),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            presigned_url_ttl_secs: parse_or(
                "PRESIGNED_URL_TTL_SECS",
                non_empty("PRESIGNED_URL_TTL_SECS"),
                PRESIGNED_URL_TTL.as_secs(),
            )?,
            downloader_backend,
            downloader_image: non_empty("DOWNLOADER_IMAGE")
                .unwrap_or_else(|| DEFAULT_DOWNLOADER_IMAGE.to_string()),
            scratch_dir: non_empty("SCRATCH_DIR").map(PathBuf::from),
            download_timeout_secs: parse_or(
                "DOWNLOAD_TIMEOUT_SECS",
                non_empty("DOWNLOAD_TIMEOUT_SECS"),
                DOWNLOAD_TIMEOUT_SECS,
            )?,
            gc_interval_secs: parse_or(
                "GC_INTERVAL_SECS",
                non_empty("GC_INTERVAL_SECS"),
                GC_INTERVAL_SECS,
            )?,
            gc_max_age_hours: parse_or(
                "GC_MAX_AGE_HOURS",
                non_empty("GC_MAX_AGE_HOURS"),
                GC_MAX_AGE_HOURS,
            )?,
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        if self.presigned_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_TTL_SECS must be greater than zero"
            ));
        }

        if self.download_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "DOWNLOAD_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.gc_max_age_hours.checked_mul(SECS_PER_HOUR).is_none() {
            return Err(anyhow::anyhow!(
                "GC_MAX_AGE_HOURS is too large: {}",
                self.gc_max_age_hours
            ));
        }

        if self.downloader_image.trim().is_empty() {
            return Err(anyhow::anyhow!("DOWNLOADER_IMAGE must not be empty"));
        }

        Ok(())
    }
}
