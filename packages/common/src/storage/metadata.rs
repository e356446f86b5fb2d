use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use super::filename::extension_of;
use super::format::format_size;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata for one file in the store, derived from the filesystem on demand.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    /// On-disk filename, unique within the store directory.
    pub name: String,
    /// Human-readable size, e.g. `12.3 MB`.
    #[serde(rename = "size")]
    pub size_human: String,
    pub size_bytes: u64,
    #[serde(rename = "modified", serialize_with = "serialize_timestamp")]
    pub modified_at: DateTime<Local>,
    #[serde(rename = "created", serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Local>,
    /// Lowercase extension without the dot; empty when the name has none.
    pub extension: String,
}

impl StoredFile {
    pub fn from_metadata(name: String, meta: &Metadata) -> Self {
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        // Not every platform/filesystem records a birth time.
        let created = meta.created().unwrap_or(modified);
        let size_bytes = meta.len();

        Self {
            extension: extension_of(&name).unwrap_or_default(),
            name,
            size_human: format_size(size_bytes),
            size_bytes,
            modified_at: DateTime::from(modified),
            created_at: DateTime::from(created),
        }
    }
}

fn serialize_timestamp<S>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Capacity of the volume holding the store directory.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn total_human(&self) -> String {
        format_size(self.total_bytes)
    }

    pub fn used_human(&self) -> String {
        format_size(self.used_bytes)
    }

    pub fn free_human(&self) -> String {
        format_size(self.free_bytes)
    }
}
