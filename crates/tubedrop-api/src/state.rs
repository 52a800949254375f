use crate::registry::DownloadRegistry;
use std::sync::Arc;
use tubedrop_core::Config;
use tubedrop_processing::ScratchDir;
use tubedrop_services::DownloadService;
use tubedrop_storage::Storage;

/// Shared state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<DownloadRegistry>,
    pub downloads: DownloadService,
    pub storage: Arc<dyn Storage>,
    /// Where the worker writes downloads before they are published.
    pub scratch: Arc<ScratchDir>,
}
