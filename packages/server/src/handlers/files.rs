use axum::Json;
use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::PendingUpload;
use common::{FileStore, StoredFile};
use tokio_util::io::ReaderStream;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::file::{MessageResponse, UploadResponse};
use crate::state::AppState;
use crate::utils::filename::{content_disposition_value, sanitize_upload_filename};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let max = usize::try_from(max_upload_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max.saturating_add(MULTIPART_OVERHEAD))
}

/// Accepts a multipart form with a `file` field and stores it under a
/// sanitized, collision-free name.
#[instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart =
        multipart.map_err(|e| AppError::Validation(format!("Expected multipart form: {e}")))?;
    let limit = state.store.max_size();

    let mut staged: Option<(String, PendingUpload)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        // Only the first `file` field is stored; everything else is ignored.
        if field.name() != Some("file") || staged.is_some() {
            continue;
        }

        let raw_name = field.file_name().unwrap_or_default().to_string();
        if raw_name.trim().is_empty() {
            return Err(AppError::Validation("No file selected".into()));
        }

        let filename = sanitize_upload_filename(&raw_name)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if !state.store.is_allowed_type(&filename) {
            return Err(AppError::Validation(format!(
                "File type not allowed: {filename}"
            )));
        }

        let upload = stream_field_to_store(field, &state.store, limit).await?;
        staged = Some((filename, upload));
    }

    let (filename, upload) =
        staged.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let file = state
        .store
        .commit(upload, &filename)
        .await
        .map_err(AppError::storage(format!("save {filename}")))?;

    info!(name = %file.name, size = file.size_bytes, "File uploaded");
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".into(),
        file,
    }))
}

/// Lists stored files, newest modification first.
#[instrument(skip(state))]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<StoredFile>>, AppError> {
    let files = state
        .store
        .list()
        .await
        .map_err(AppError::storage("list files"))?;
    Ok(Json(files))
}

/// Streams a stored file as an attachment.
#[instrument(skip(state))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let (file, handle) = state
        .store
        .open(&name)
        .await
        .map_err(AppError::storage(format!("download {name}")))?;

    let content_type = mime_guess::from_path(&file.name).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(handle));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, file.size_bytes.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&file.name),
        )
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Removes a stored file.
#[instrument(skip(state))]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .store
        .delete(&name)
        .await
        .map_err(AppError::storage(format!("delete {name}")))?;

    info!(%name, "File deleted");
    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// Stream a multipart field into the store's staging area.
async fn stream_field_to_store(
    mut field: Field<'_>,
    store: &FileStore,
    limit: u64,
) -> Result<PendingUpload, AppError> {
    let mut upload = store
        .begin_upload()
        .await
        .map_err(AppError::storage("stage upload"))?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        upload
            .write_chunk(&chunk)
            .await
            .map_err(AppError::storage("write upload chunk"))?;
    }

    Ok(upload)
}

fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}
