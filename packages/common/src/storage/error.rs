use thiserror::Error;

use super::filename::FilenameError;

/// Errors that can occur during file store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested file does not exist in the store directory.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The supplied name is not a valid flat filename.
    #[error("{0}")]
    InvalidName(#[from] FilenameError),

    /// The name resolved to a location outside the store directory.
    #[error("path escapes store directory: {0}")]
    OutsideRoot(String),

    /// The upload exceeds the configured size limit.
    #[error("file exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
