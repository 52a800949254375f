//! HTML pages for browser users.

use crate::constants::PENDING_REFRESH_SECS;
use crate::error::HttpAppError;
use crate::handlers::downloads::find_download;
use crate::registry::{DownloadRecord, DownloadStatus};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
};
use std::sync::Arc;

const FAILED_MESSAGE: &str = "Failed to download :(";

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        head_extra,
        body
    )
}

pub async fn index() -> impl IntoResponse {
    let body = r#"<h1>tubedrop</h1>
<form method="post" action="/downloads">
  <label for="url">Video URL</label>
  <input type="url" id="url" name="url" required>
  <select name="audio_only">
    <option value="true" selected>Audio only (mp3)</option>
    <option value="false">Video</option>
  </select>
  <button type="submit">Download</button>
</form>
"#;
    Html(layout("tubedrop", "", body))
}

fn render_download(record: &DownloadRecord) -> String {
    let source = format!("<p>Source: {}</p>\n", escape_html(&record.remote_url));
    match &record.status {
        DownloadStatus::Pending => layout(
            "Downloading...",
            &format!(
                "<meta http-equiv=\"refresh\" content=\"{}\">\n",
                PENDING_REFRESH_SECS
            ),
            &format!("<h1>Downloading...</h1>\n{}<p>This page refreshes until the file is ready.</p>\n", source),
        ),
        DownloadStatus::Completed { url } => {
            let url = escape_html(url);
            layout(
                "Download ready",
                "",
                &format!(
                    "<h1>Download ready</h1>\n{}<p><a href=\"{}\">{}</a></p>\n",
                    source, url, url
                ),
            )
        }
        DownloadStatus::Failed { error } => layout(
            "Download failed",
            "",
            &format!(
                "<h1>{}</h1>\n{}<p>{}</p>\n",
                FAILED_MESSAGE,
                source,
                escape_html(error)
            ),
        ),
    }
}

#[tracing::instrument(skip(state))]
pub async fn show_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = find_download(&state.registry, &id).await?;
    Ok(Html(render_download(&record)))
}
