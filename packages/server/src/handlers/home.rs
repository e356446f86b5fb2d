use axum::extract::State;
use axum::response::Html;
use common::storage::format_size;
use tracing::{error, instrument};

use crate::page::HomePage;
use crate::state::AppState;

/// Renders the landing page: share URL, QR code, disk usage, upload form and file list.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let files = state.store.list().await.unwrap_or_else(|e| {
        error!(error = %e, "Failed to list files for home page");
        Vec::new()
    });

    let disk = state
        .store
        .disk_usage()
        .inspect_err(|e| error!(error = %e, "Failed to read disk usage"))
        .ok();

    let page = HomePage {
        share_url: &state.share_url,
        qr_src: format!("/static/{}", state.config.storage.qr_code_file),
        disk,
        max_upload_size: format_size(state.config.storage.max_upload_size),
        allowed_extensions: &state.config.storage.allowed_extensions,
        files: &files,
    };

    Html(page.render())
}
