use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::config::StorageConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(storage: &StorageConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home::index))
        .route("/files", get(handlers::files::list_files))
        .route("/download/{name}", get(handlers::files::download_file))
        .route("/delete/{name}", delete(handlers::files::delete_file))
        .route("/static/{name}", get(handlers::assets::serve_static))
        .merge(upload_routes(storage.max_upload_size))
}

fn upload_routes(max_upload_size: u64) -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::files::upload_file))
        .layer(handlers::files::upload_body_limit(max_upload_size))
}
