use std::sync::Arc;

use common::FileStore;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub config: AppConfig,
    /// `http://<lan-ip>:<port>`, resolved once at startup.
    pub share_url: String,
}
