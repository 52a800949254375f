//! Download submission and status handlers.

use crate::error::HttpAppError;
use crate::registry::{DownloadRecord, DownloadRegistry};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tubedrop_core::{AppError, ErrorMetadata};
use tubedrop_processing::DownloadOptions;
use tubedrop_services::DownloadService;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateDownloadForm {
    pub url: String,
    /// Missing means audio only.
    #[serde(default)]
    pub audio_only: Option<String>,
}

fn parse_audio_only(value: Option<&str>) -> Result<bool, AppError> {
    match value.map(|v| v.trim().to_lowercase()) {
        None => Ok(true),
        Some(v) if v.is_empty() => Ok(true),
        Some(v) => match v.as_str() {
            "true" | "on" | "1" | "yes" => Ok(true),
            "false" | "off" | "0" | "no" => Ok(false),
            _ => Err(AppError::InvalidInput(format!(
                "audio_only must be true or false, got {:?}",
                v
            ))),
        },
    }
}

fn validate_remote_url(url: &str) -> Result<&str, AppError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| AppError::InvalidInput("url must start with http:// or https://".to_string()))?;
    if rest.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidInput(format!("Invalid url: {:?}", url)));
    }
    Ok(url)
}

/// Parse a download id from the path. Malformed ids are reported as unknown.
pub(crate) fn parse_download_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Download not found".to_string()))
}

pub(crate) async fn find_download(
    registry: &DownloadRegistry,
    raw_id: &str,
) -> Result<DownloadRecord, AppError> {
    let id = parse_download_id(raw_id)?;
    registry
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("Download not found".to_string()))
}

fn spawn_download_job(
    downloads: DownloadService,
    registry: Arc<DownloadRegistry>,
    record: &DownloadRecord,
) {
    let id = record.id;
    let remote_url = record.remote_url.clone();
    let options = DownloadOptions {
        audio_only: record.audio_only,
    };

    tokio::spawn(async move {
        match downloads.process(&remote_url, options).await {
            Ok(public_url) => {
                tracing::info!(download_id = %id, "Download published");
                registry.complete(id, public_url).await;
            }
            Err(e) => {
                crate::error::log_error(&e);
                registry.fail(id, e.client_message()).await;
            }
        }
    });
}

#[tracing::instrument(skip(state, form), fields(url = %form.url))]
pub async fn create_download(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateDownloadForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let remote_url = validate_remote_url(&form.url)?;
    let audio_only = parse_audio_only(form.audio_only.as_deref())?;

    let record = state.registry.create(remote_url, audio_only).await;
    tracing::info!(download_id = %record.id, audio_only, "Download accepted");

    spawn_download_job(state.downloads.clone(), state.registry.clone(), &record);

    Ok(Redirect::to(&format!("/downloads/{}", record.id)))
}

#[tracing::instrument(skip(state))]
pub async fn get_download_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = find_download(&state.registry, &id).await?;
    Ok(Json(record))
}
