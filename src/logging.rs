//! Logging
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (overridable
//! with `RUST_LOG`), a stderr layer, and a file layer when running in
//! debug mode or when a log file is configured.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "tnl-booking.log";
const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct LogConfig {
    debug_mode: bool,
    level: String,
    log_dir: PathBuf,
    log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            level: "info".to_string(),
            log_dir: get_log_path(),
            log_file: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug mode raises the default level to `debug` and writes a daily
    /// log file
    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = dir;
        self
    }

    /// Always log to this file, in addition to stderr
    pub fn with_log_file(mut self, file: Option<PathBuf>) -> Self {
        self.log_file = file;
        self
    }

    /// Where daily debug logs go, and where cleanup looks for old ones
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn default_directive(&self) -> &str {
        if self.debug_mode { "debug" } else { &self.level }
    }
}

/// Install the global subscriber. The returned guard flushes the file
/// writer on drop and must be held until exit.
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_directive()))
        .context("Invalid log filter")?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let appender = if let Some(file) = &config.log_file {
        let dir = file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let name = file
            .file_name()
            .context("Log file path has no file name")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
        Some(tracing_appender::rolling::never(dir, name))
    } else if config.debug_mode {
        fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;
        Some(tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX))
    } else {
        None
    };

    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// Directory the daily debug logs are written to
pub fn get_log_path() -> PathBuf {
    PathBuf::from(".tnl-booking").join("logs")
}

/// Delete debug log files in `dir` older than `days`. Returns how many
/// were removed.
pub fn cleanup_old_logs(dir: &Path, days: u64) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(days * SECS_PER_DAY))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(".log"));
        if !is_log || !path.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if modified < cutoff {
            fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
            removed += 1;
        }
    }
    Ok(removed)
}
