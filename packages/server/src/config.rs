use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Extensions accepted for upload when no override is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 16] = [
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "xls", "xlsx", "zip", "rar", "7z",
    "mp3", "mp4", "avi",
];

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Flat directory holding uploaded files.
    pub upload_dir: PathBuf,
    /// Directory for generated assets served under `/static`.
    pub static_dir: PathBuf,
    /// File name of the generated QR image inside `static_dir`.
    pub qr_code_file: String,
    /// Maximum upload size in bytes. Default: 512 MiB.
    pub max_upload_size: u64,
    /// Lowercase extensions accepted for upload. Empty accepts any file.
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    pub dir: PathBuf,
    pub file_name: String,
    /// Rotate once the active file reaches this many bytes.
    pub max_file_size: u64,
    /// Number of rotated backups kept next to the active file.
    pub max_files: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QrConfig {
    /// Edge length of one QR module, in pixels.
    pub module_size: u32,
    /// Quiet zone width, in modules.
    pub border: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub qr: QrConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., LANSHARE__SERVER__PORT=8080)
            .add_source(
                Environment::with_prefix("LANSHARE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("storage.allowed_extensions")
                    .with_list_parse_key("server.cors.allow_origins"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Location of the generated QR image on disk.
    pub fn qr_code_path(&self) -> PathBuf {
        self.storage.static_dir.join(&self.storage.qr_code_file)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            cors: CorsConfig::default(),
        }
    }
}

fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            qr_code_file: "qr_code.png".into(),
            max_upload_size: 512 * 1024 * 1024,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            dir: PathBuf::from("logs"),
            file_name: "app.log".into(),
            max_file_size: 10_000_000,
            max_files: 5,
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            module_size: 10,
            border: 4,
        }
    }
}
