use std::collections::HashSet;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use super::BoxReader;
use super::error::StorageError;
use super::filename::{extension_of, suffixed_name, validate_flat_filename};
use super::metadata::{DiskUsage, StoredFile};

/// Staging area for in-flight uploads, inside the store root.
const STAGING_DIR: &str = ".tmp";

/// Flat directory of uploaded files.
///
/// There is no in-memory index: every call goes to the filesystem, so files
/// added or removed behind the server's back show up on the next listing.
/// Uploads are written to `{root}/.tmp/{uuid}` and renamed into place only
/// once complete, so a listing never shows a partially written file.
///
/// No lock is held between picking a free name and renaming into it; two
/// concurrent uploads of the same name can race and the later rename wins.
pub struct FileStore {
    root: PathBuf,
    max_size: u64,
    allowed_extensions: HashSet<String>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn new(root: impl AsRef<Path>, max_size: u64) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root.join(STAGING_DIR)).await?;
        let root = fs::canonicalize(root).await?;

        Ok(Self {
            root,
            max_size,
            allowed_extensions: HashSet::new(),
        })
    }

    /// Restrict uploads to the given extensions. An empty set accepts anything.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Canonical store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// True iff `filename` has an extension on the allow-list (case-insensitive).
    pub fn is_allowed_type(&self, filename: &str) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        extension_of(filename).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }

    /// Map an untrusted name to an existing path inside the store.
    ///
    /// The name must be flat, and the canonical result must be a descendant
    /// of the canonical root, which also rules out symlinks pointing elsewhere.
    ///
    /// Lookups never trim: `"x.txt "` names a different file than `"x.txt"`.
    async fn resolve(&self, name: &str) -> Result<(String, PathBuf), StorageError> {
        let flat = validate_flat_filename(name)?;
        if flat != name {
            return Err(StorageError::NotFound(name.to_string()));
        }
        let canonical = fs::canonicalize(self.root.join(flat))
            .await
            .map_err(|e| io_error(e, flat))?;

        if canonical == self.root || !canonical.starts_with(&self.root) {
            return Err(StorageError::OutsideRoot(flat.to_string()));
        }

        Ok((flat.to_string(), canonical))
    }

    /// Metadata for a single regular file.
    pub async fn stat(&self, name: &str) -> Result<StoredFile, StorageError> {
        let (name, path) = self.resolve(name).await?;
        let meta = fs::metadata(&path).await.map_err(|e| io_error(e, &name))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(name));
        }
        Ok(StoredFile::from_metadata(name, &meta))
    }

    /// Open a regular file for streaming, along with its metadata.
    pub async fn open(&self, name: &str) -> Result<(StoredFile, fs::File), StorageError> {
        let (name, path) = self.resolve(name).await?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| io_error(e, &name))?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(name));
        }
        Ok((StoredFile::from_metadata(name, &meta), file))
    }

    /// Remove a regular file from the store.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let (name, path) = self.resolve(name).await?;
        let meta = fs::metadata(&path).await.map_err(|e| io_error(e, &name))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(name));
        }
        fs::remove_file(&path).await.map_err(|e| io_error(e, &name))
    }

    /// All regular files directly inside the store, newest modification first.
    pub async fn list(&self) -> Result<Vec<StoredFile>, StorageError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let is_file = match entry.file_type().await {
                Ok(file_type) => file_type.is_file(),
                Err(e) => {
                    debug!(path = ?entry.path(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !is_file {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = ?entry.path(), "Skipping file with non UTF-8 name");
                continue;
            };
            // Only list what download and delete can address.
            if validate_flat_filename(&name) != Ok(name.as_str()) {
                debug!(%name, "Skipping file with unaddressable name");
                continue;
            }

            match entry.metadata().await {
                Ok(meta) => files.push(StoredFile::from_metadata(name, &meta)),
                // Deleted between read_dir and stat.
                Err(e) => debug!(%name, error = %e, "File vanished during listing"),
            }
        }

        files.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(files)
    }

    /// First of `name`, `base_1.ext`, `base_2.ext`, ... not present in the store.
    pub async fn unique_name(&self, name: &str) -> Result<String, StorageError> {
        let name = validate_flat_filename(name)?;
        if !fs::try_exists(self.root.join(name)).await? {
            return Ok(name.to_string());
        }

        let mut n = 1;
        loop {
            let candidate = suffixed_name(name, n);
            if !fs::try_exists(self.root.join(&candidate)).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Start a new staged upload bounded by the store's size limit.
    pub async fn begin_upload(&self) -> Result<PendingUpload, StorageError> {
        let path = self
            .root
            .join(STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());
        let file = fs::File::create(&path).await?;

        Ok(PendingUpload {
            path,
            file: Some(file),
            written: 0,
            limit: self.max_size,
            armed: true,
        })
    }

    /// Move a finished upload into the store under a collision-free name.
    pub async fn commit(
        &self,
        mut upload: PendingUpload,
        name: &str,
    ) -> Result<StoredFile, StorageError> {
        upload.finish().await?;

        let final_name = self.unique_name(name).await?;
        let target = self.root.join(&final_name);
        fs::rename(&upload.path, &target).await?;
        upload.armed = false;

        let meta = fs::metadata(&target).await?;
        Ok(StoredFile::from_metadata(final_name, &meta))
    }

    /// Store data from an async reader and return the stored file.
    pub async fn save_stream(
        &self,
        name: &str,
        mut reader: BoxReader,
    ) -> Result<StoredFile, StorageError> {
        validate_flat_filename(name)?;

        let mut upload = self.begin_upload().await?;
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            upload.write_chunk(&buf[..n]).await?;
        }

        self.commit(upload, name).await
    }

    /// Store an in-memory buffer and return the stored file.
    pub async fn save(&self, name: &str, data: &[u8]) -> Result<StoredFile, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.save_stream(name, reader).await
    }

    /// Capacity of the volume holding the store.
    pub fn disk_usage(&self) -> Result<DiskUsage, StorageError> {
        let total = fs2::total_space(&self.root)?;
        let free = fs2::free_space(&self.root)?;
        let available = fs2::available_space(&self.root)?;

        Ok(DiskUsage {
            total_bytes: total,
            used_bytes: total.saturating_sub(free),
            free_bytes: available,
        })
    }
}

/// Content being streamed into the staging area.
///
/// Dropping it without passing it to [`FileStore::commit`] deletes the staged
/// bytes.
pub struct PendingUpload {
    path: PathBuf,
    file: Option<fs::File>,
    written: u64,
    limit: u64,
    armed: bool,
}

impl PendingUpload {
    /// Bytes accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        self.written += chunk.len() as u64;
        if self.written > self.limit {
            self.discard().await;
            return Err(StorageError::SizeLimitExceeded {
                actual: self.written,
                limit: self.limit,
            });
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| std::io::Error::other("upload already finished"))?;
        file.write_all(chunk).await?;
        Ok(())
    }

    /// Close and remove the staged file. `Drop` covers paths that never get here.
    async fn discard(&mut self) {
        self.file.take();
        if self.armed {
            if let Err(e) = fs::remove_file(&self.path).await {
                warn!(path = ?self.path, error = %e, "Failed to remove staged upload");
            }
            self.armed = false;
        }
    }

    async fn finish(&mut self) -> Result<(), StorageError> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
        }
        Ok(())
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        self.file.take();
        if self.armed {
            // Best effort.
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn io_error(err: std::io::Error, name: &str) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(err)
    }
}
