//! Test helpers: build the application against in-process backends.
//!
//! Run from workspace root: `cargo test -p tubedrop-api`. Nothing here needs
//! Docker or network access; downloads go through `FakeContentDownloader` or a
//! test-provided downloader, and storage is in memory or a temp directory.

use axum_test::TestServer;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubedrop_api::constants;
use tubedrop_api::registry::DownloadRegistry;
use tubedrop_api::setup::{initialize_app, routes};
use tubedrop_api::state::AppState;
use tubedrop_core::Config;
use tubedrop_processing::{ContentDownloader, RemoteStoreContentUploader, ScratchDir};
use tubedrop_services::DownloadService;
use tubedrop_storage::{InMemoryStorage, Storage};

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn config_from(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Test application: server plus the state behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: Option<TempDir>,
}

impl TestApp {
    /// Fake downloader publishing into in-memory storage.
    pub async fn fake() -> Self {
        let config = config_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("DOWNLOADER_BACKEND", "fake"),
        ]);
        let (state, router) = initialize_app(config).await.unwrap();
        Self {
            server: TestServer::new(router).unwrap(),
            state,
            _temp_dir: None,
        }
    }

    /// Fake downloader publishing into a local bucket served under `/files`.
    pub async fn local_bucket() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let bucket = temp_dir.path().join("bucket");
        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", bucket.to_str().unwrap()),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost/files"),
            ("DOWNLOADER_BACKEND", "fake"),
        ]);
        let (state, router) = initialize_app(config).await.unwrap();
        Self {
            server: TestServer::new(router).unwrap(),
            state,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Arbitrary downloader publishing into in-memory storage.
    pub fn with_downloader(downloader: Arc<dyn ContentDownloader>, timeout: Duration) -> Self {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let state = Arc::new(AppState {
            config: config_from(&[("STORAGE_BACKEND", "memory")]),
            registry: Arc::new(DownloadRegistry::new()),
            downloads: DownloadService::new(
                downloader,
                Arc::new(RemoteStoreContentUploader::new(storage.clone())),
                timeout,
            ),
            storage,
            scratch: Arc::new(ScratchDir::temporary().unwrap()),
        });
        let router = routes::setup_routes(state.clone()).unwrap();
        Self {
            server: TestServer::new(router).unwrap(),
            state,
            _temp_dir: None,
        }
    }

    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Submit a download and return the page path it redirects to.
    pub async fn submit(&self, form: &[(&str, &str)]) -> String {
        let response = self.server.post("/downloads").form(&form).await;
        assert_eq!(response.status_code(), 303);
        response
            .header("location")
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Poll the JSON status until the download leaves `pending`.
    pub async fn wait_for_download(&self, id: &str) -> Value {
        for _ in 0..200 {
            let body: Value = self
                .server
                .get(&api_path(&format!("/downloads/{}", id)))
                .await
                .json();
            if body["status"] != "pending" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("download {} still pending", id);
    }
}

/// Download id from a `/downloads/{id}` location.
pub fn id_from_location(location: &str) -> String {
    location
        .strip_prefix("/downloads/")
        .unwrap_or_else(|| panic!("unexpected location {}", location))
        .to_string()
}
