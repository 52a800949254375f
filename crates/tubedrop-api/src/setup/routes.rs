//! Route configuration and setup

use crate::constants::{
    API_PREFIX, LOCAL_FILES_PATH, MAX_CONCURRENT_REQUESTS, MAX_REQUEST_BODY_BYTES,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubedrop_core::StorageBackend;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    // Status polling from other origins is harmless; submissions stay same-origin.
    let api_routes = Router::new()
        .route(
            &format!("{}/downloads/{{id}}", API_PREFIX),
            get(handlers::downloads::get_download_status),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        );

    let mut router = Router::new()
        .route("/", get(handlers::pages::index))
        .route("/health", get(handlers::health::health_check))
        .route("/downloads", post(handlers::downloads::create_download))
        .route("/downloads/{id}", get(handlers::pages::show_download))
        .merge(api_routes);

    if state.config.storage_backend() == StorageBackend::Local {
        let root = state.config.local_storage_path().ok_or_else(|| {
            anyhow::anyhow!("LOCAL_STORAGE_PATH must be set when using local storage backend")
        })?;
        tracing::info!(root = %root, path = LOCAL_FILES_PATH, "Serving local bucket");
        router = router.nest_service(LOCAL_FILES_PATH, ServeDir::new(root));
    }

    Ok(router
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
