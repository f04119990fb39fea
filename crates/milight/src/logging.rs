//! Logging configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

const LOG_PREFIX: &str = "milight-";
const LOG_SUFFIX: &str = ".log";

/// Where and how much to log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level: error, warn, info, debug or trace
    pub level: String,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a daily file in `log_dir`
    pub file_output: bool,
    pub log_dir: PathBuf,
    /// Number of daily log files to keep
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: default_log_dir(),
            max_files: 7,
        }
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("milight").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

impl LogConfig {
    /// Configured level, `INFO` if it cannot be parsed
    pub fn parse_level(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory when file output is on.
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Log file for today
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir
            .join(format!("{}{}{}", LOG_PREFIX, date, LOG_SUFFIX))
    }

    /// Delete the oldest log files so at most `max_files` remain, counting
    /// today's. Returns the number of files removed.
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.file_output || !self.log_dir.is_dir() {
            return Ok(0);
        }

        let current = self.current_log_path();
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path != &current && is_log_file(path))
            .collect();
        // Names embed the date, so lexical order is chronological
        logs.sort();

        let keep = self.max_files.saturating_sub(1);
        let excess = logs.len().saturating_sub(keep);
        for path in &logs[..excess] {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn is_log_file(path: &std::path::Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX))
}
