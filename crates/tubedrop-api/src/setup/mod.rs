//! Application setup and initialization
//!
//! Everything `main` needs to go from a validated `Config` to a router, kept
//! out of `main.rs` so tests can build the same application.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubedrop_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        storage = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(config, storage)?;

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
