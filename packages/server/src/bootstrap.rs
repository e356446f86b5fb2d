use std::sync::Arc;

use anyhow::Context;
use common::{FileStore, StorageError};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::build_router;
use crate::config::{AppConfig, StorageConfig};
use crate::net;
use crate::qr::QrEncoder;
use crate::state::AppState;

/// Open the upload directory with the configured size limit and allow-list.
pub async fn open_store(config: &StorageConfig) -> Result<FileStore, StorageError> {
    Ok(FileStore::new(&config.upload_dir, config.max_upload_size)
        .await?
        .with_allowed_extensions(&config.allowed_extensions))
}

/// Resolve the LAN share URL and write its QR image.
///
/// Neither step can fail startup: the address falls back to loopback and a
/// QR failure only leaves the page without a working image.
pub fn publish_share_url(config: &AppConfig) -> String {
    let ip = net::resolve_local_address();
    let url = net::share_url(ip, config.server.port);

    let path = config.qr_code_path();
    match QrEncoder::from_config(&config.qr).write_png(&url, &path) {
        Ok(()) => info!(path = ?path, "QR code written"),
        Err(e) => error!(error = %e, "Failed to generate QR code"),
    }

    url
}

pub async fn build_state(config: AppConfig, share_url: String) -> anyhow::Result<AppState> {
    let store = open_store(&config.storage).await.with_context(|| {
        format!(
            "Failed to open upload directory {}",
            config.storage.upload_dir.display()
        )
    })?;

    Ok(AppState {
        store: Arc::new(store),
        config,
        share_url,
    })
}

/// Set up synchronously, then block in the listener until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let share_url = publish_share_url(&config);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = build_state(config, share_url.clone()).await?;
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Starting...");
    info!("Access the system by visiting {share_url}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}
