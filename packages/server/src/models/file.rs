use common::StoredFile;
use serde::Serialize;

/// Response body for a successful upload.
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    /// Metadata of the stored file, including the final (possibly suffixed) name.
    pub file: StoredFile,
}

/// Plain confirmation body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
