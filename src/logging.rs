//! Logging setup built on `tracing`.
//!
//! Console logging is always on. In debug mode (`--debug`), logs are
//! additionally written to daily-rotated files under `.crabvoice/logs/` so a
//! failed session can be inspected after the fact. API keys are never logged.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable debug mode (file logging + debug level)
    pub debug_mode: bool,

    /// Directory for log files (default: ./.crabvoice/logs)
    pub log_dir: PathBuf,

    /// Base level from the config file's `logging.level` / `CRABVOICE_LOG_LEVEL`
    pub level: Option<String>,

    /// Explicit log file from `logging.file` / `CRABVOICE_LOG_FILE`
    pub log_file: Option<PathBuf>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            log_dir: PathBuf::from(".crabvoice/logs"),
            level: None,
            log_file: None,
        }
    }

    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = dir;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_log_file(mut self, file: Option<PathBuf>) -> Self {
        self.log_file = file;
        self
    }

    /// Default filter used when `RUST_LOG` is not set. `--debug` raises the
    /// configured level to debug but never lowers an explicit trace.
    pub fn filter_directive(&self) -> String {
        let configured = self.level.as_deref().unwrap_or("info");
        let level = if self.debug_mode && configured != "trace" {
            "debug"
        } else {
            configured
        };
        format!("crabvoice={level},warn")
    }

    /// Where file logs go, if anywhere: an explicit `logging.file` wins,
    /// otherwise debug mode writes under `log_dir`.
    fn file_target(&self) -> Option<(PathBuf, String)> {
        if let Some(path) = &self.log_file {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "crabvoice.log".to_string());
            Some((dir, name))
        } else if self.debug_mode {
            Some((self.log_dir.clone(), "crabvoice.log".to_string()))
        } else {
            None
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns a guard that must be kept alive for the duration of the program,
/// otherwise buffered file logs are dropped on exit.
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(config.debug_mode)
        .with_writer(std::io::stderr);

    if let Some((dir, file_name)) = config.file_target() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

        // An explicit logging.file appends to that exact file; the --debug
        // default rotates daily under log_dir
        let file_appender = if config.log_file.is_some() {
            tracing_appender::rolling::never(&dir, &file_name)
        } else {
            tracing_appender::rolling::daily(&dir, &file_name)
        };
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        tracing::debug!("File logging enabled: {}", dir.join(&file_name).display());
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        Ok(None)
    }
}

/// Remove log files older than `max_age_days`. Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &PathBuf, max_age_days: u64) -> Result<usize> {
    let mut removed = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    let max_age = std::time::Duration::from_secs(max_age_days * 24 * 60 * 60);
    let now = std::time::SystemTime::now();

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if let Ok(age) = now.duration_since(modified)
            && age > max_age
        {
            if std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
    }

    Ok(removed)
}
