use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::utils::app_paths::AppPaths;
use crate::utils::logging::LogEntry;

/// Global file logger instance
static FILE_LOGGER: OnceLock<Option<FileLogger>> = OnceLock::new();

/// Persistent half of the dual logging setup: one timestamped file per run
pub struct FileLogger {
    log_file: Mutex<File>,
    log_path: PathBuf,
}

impl FileLogger {
    /// Create a timestamped log file in `log_dir` and point `latest.log` at it
    pub fn create_in(log_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("catalog-cli_{timestamp}.log"));

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let latest_path = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        #[cfg(windows)]
        {
            // Symlinks need elevated rights on Windows
            let _ = std::fs::write(
                &latest_path,
                format!("Current log file: {}\n", log_path.display()),
            );
        }

        Ok(Self {
            log_file: Mutex::new(log_file),
            log_path,
        })
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = writeln!(file, "{}", entry.format_for_display());
            let _ = file.flush(); // Keep the tail intact if the terminal dies
        }

        if std::env::var_os("CATALOG_CLI_DEBUG").is_some() {
            eprintln!("{}", entry.format_for_display());
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = file.flush();
        }
    }
}

/// Initialize the global file logger. Returns None when the log directory
/// is not writable; logging then continues in memory only.
pub fn init_file_logger() -> Option<&'static FileLogger> {
    FILE_LOGGER
        .get_or_init(|| FileLogger::create_in(&AppPaths::log_dir()).ok())
        .as_ref()
}

/// Get the global file logger
pub fn get_file_logger() -> Option<&'static FileLogger> {
    FILE_LOGGER.get().and_then(|logger| logger.as_ref())
}
