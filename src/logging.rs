//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr through `tracing-subscriber`'s fmt layer. With
//! `logging.file = true` a daily rolling file under `{data_dir}/logs` is
//! added through a non-blocking `tracing-appender` writer; the returned
//! [`LogGuard`] must live until exit or buffered lines are lost.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::LoggingConfig;
use crate::error::{Result, ServiceError};

/// Filter used when neither `RUST_LOG` nor `logging.level` is set.
pub const DEFAULT_FILTER: &str = "techsearch=info,techsearch_providers=info";

/// Daily log files kept on disk.
pub const MAX_LOG_FILES: usize = 7;

const LOG_FILE_PREFIX: &str = "techsearch";

/// Keeps the file writer flushing. Drop at shutdown.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns [`ServiceError::Config`] if a subscriber is already installed
/// or the log directory cannot be used.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    init_with_dir(config, &crate::app_dirs::logs_dir())
}

/// [`init`] with an explicit log directory.
///
/// # Errors
///
/// Same as [`init`].
pub fn init_with_dir(config: &LoggingConfig, logs_dir: &Path) -> Result<LogGuard> {
    let directive = filter_directive(
        std::env::var("RUST_LOG").ok().as_deref(),
        config.level.as_deref(),
    );
    let filter = EnvFilter::try_new(&directive)
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| ServiceError::Config(format!("invalid log filter: {e}")))?;

    let (file_layer, guard) = if config.file {
        let appender = rolling_appender(logs_dir)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| ServiceError::Config(format!("logging already initialised: {e}")))?;

    if config.file {
        tracing::debug!(dir = %logs_dir.display(), "file logging enabled");
    }
    Ok(LogGuard { _file: guard })
}

/// `RUST_LOG` wins, then the configured level, then [`DEFAULT_FILTER`].
pub fn filter_directive(rust_log: Option<&str>, configured: Option<&str>) -> String {
    rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| configured.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_FILTER)
        .to_owned()
}

/// Daily-rotating `techsearch.YYYY-MM-DD.log` files, oldest pruned beyond
/// [`MAX_LOG_FILES`].
fn rolling_appender(logs_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(logs_dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(logs_dir)
        .map_err(|e| ServiceError::Config(format!("cannot open log file: {e}")))
}
