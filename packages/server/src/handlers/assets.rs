use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common::storage::validate_flat_filename;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Serves generated assets (the QR image) from the static directory.
#[instrument(skip(state))]
pub async fn serve_static(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let file_name =
        validate_flat_filename(&file_name).map_err(|e| AppError::Validation(e.to_string()))?;
    let path = state.config.storage.static_dir.join(file_name);

    let content = match tokio::fs::read(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Asset not found".to_string()));
        }
        Err(e) => return Err(AppError::Internal(format!("IO error reading {file_name}: {e}"))),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    // The QR image changes whenever the LAN address does.
    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(e.to_string()))
}
