//! Storage initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tubedrop_core::Config;
use tubedrop_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .with_context(|| format!("Failed to initialize {} storage", config.storage_backend()))?;

    tracing::info!(backend = %storage.backend_type(), "Storage initialized");
    Ok(storage)
}
