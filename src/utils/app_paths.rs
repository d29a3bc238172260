use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "catalog-cli";

/// Per-user directories for config, history and logs
pub struct AppPaths;

impl AppPaths {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Cannot determine config directory"))?
            .join(APP_DIR);
        Ok(dir)
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join(APP_DIR);

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// REPL history for `--classic` mode
    pub fn history_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("search_history.txt"))
    }

    /// Log directory, falling back to the temp dir when no data dir exists
    pub fn log_dir() -> PathBuf {
        Self::data_dir()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|_| std::env::temp_dir().join(APP_DIR))
    }
}
