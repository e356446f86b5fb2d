mod error;
mod filename;
mod format;
mod metadata;

pub mod filesystem;

use tokio::io::AsyncRead;

pub use error::StorageError;
pub use filename::{FilenameError, extension_of, suffixed_name, validate_flat_filename};
pub use filesystem::{FileStore, PendingUpload};
pub use format::format_size;
pub use metadata::{DiskUsage, StoredFile};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;
