pub mod storage;

pub use storage::{DiskUsage, FileStore, StorageError, StoredFile};
