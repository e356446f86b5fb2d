use std::fs;
use std::io;
use std::sync::Mutex;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Install the global subscriber: console output plus a size-rotated log file.
///
/// If the log file cannot be opened the server keeps running with console
/// logging only.
pub fn init(config: &LoggingConfig) {
    let level = config.level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);

    let (file_layer, file_error) = match open_log_file(config) {
        Ok(appender) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(appender)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    let installed = tracing_subscriber::registry()
        .with(level)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        return;
    }
    if let Some(e) = file_error {
        warn!(dir = ?config.dir, error = %e, "Failed to open log file, logging to console only");
    }
}

fn open_log_file(config: &LoggingConfig) -> io::Result<BasicRollingFileAppender> {
    fs::create_dir_all(&config.dir)?;
    BasicRollingFileAppender::new(
        config.dir.join(&config.file_name),
        RollingConditionBasic::new().max_size(config.max_file_size),
        config.max_files,
    )
}
