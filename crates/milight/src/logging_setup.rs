//! Subscriber setup: stderr console plus the daily `milight-YYYY-MM-DD.log`

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

use crate::logging::LogConfig;

/// Today's log file, opened for appending after old files were pruned
#[derive(Debug)]
struct DailyLog {
    path: PathBuf,
    file: File,
    pruned: usize,
}

impl DailyLog {
    /// `None` when file output is off.
    fn open(config: &LogConfig) -> Result<Option<Self>> {
        if !config.file_output {
            return Ok(None);
        }
        config
            .ensure_log_directory()
            .with_context(|| format!("Failed to create log directory {:?}", config.log_dir))?;

        // Pruning failures only warn
        let pruned = config.cleanup_old_logs().unwrap_or_else(|e| {
            eprintln!("Warning: could not prune old logs in {:?}: {}", config.log_dir, e);
            0
        });

        let path = config.current_log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;

        Ok(Some(Self { path, file, pruned }))
    }
}

/// Holds the file writer thread; pending lines are flushed on drop
pub struct LogGuard {
    _writer: Option<WorkerGuard>,
    file: Option<PathBuf>,
}

impl LogGuard {
    /// Log file being written, if file output is on
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// `RUST_LOG` wins over the configured level.
fn level_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    let daily = DailyLog::open(config)?;

    // stdout carries command output, so the console layer writes to stderr
    let console = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(level_filter(config))
    });

    let mut guard = LogGuard {
        _writer: None,
        file: None,
    };
    let mut pruned = 0;
    let file = daily.map(|daily| {
        let (writer, worker) = tracing_appender::non_blocking(daily.file);
        guard._writer = Some(worker);
        guard.file = Some(daily.path);
        pruned = daily.pruned;
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_thread_names(true)
            .with_filter(level_filter(config))
    });

    tracing_subscriber::registry().with(console).with(file).init();

    tracing::debug!("Log level {}", config.parse_level());
    if let Some(path) = guard.file() {
        tracing::debug!("Writing log to {:?} ({} old file(s) pruned)", path, pruned);
    }
    Ok(guard)
}
