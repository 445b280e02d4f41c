use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Overrides the database file location.
pub(crate) const DB_ENV: &str = "BOOKKEEPER_DB";
/// Log filter directives, e.g. `debug` or `bookkeeper::repository=debug`.
pub(crate) const LOG_ENV: &str = "BOOKKEEPER_LOG";

const DEFAULT_LOG_FILTER: &str = "info";
const DB_FILE: &str = "bookkeeper.db";
const LOG_FILE: &str = "bookkeeper.log";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) log_filter: String,
}

impl Config {
    /// Resolve paths from the platform data directory and the environment,
    /// creating the database directory if needed.
    pub(crate) fn load() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "bookkeeper", "Bookkeeper")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let config = Self::from_lookup(proj_dirs.data_dir(), |key| std::env::var(key).ok());
        if let Some(dir) = config.db_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        Ok(config)
    }

    pub(crate) fn from_lookup<F>(data_dir: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = non_empty(DB_ENV)
            .map(|p| PathBuf::from(crate::run::shellexpand(p.trim())))
            .unwrap_or_else(|| data_dir.join(DB_FILE));
        let log_path = db_path.with_file_name(LOG_FILE);
        let log_filter = non_empty(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            db_path,
            log_path,
            log_filter,
        }
    }
}

/// Install the global subscriber. Events go to the log file, never to the
/// terminal, so the form screen stays intact.
pub(crate) fn init_tracing(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file: {}", config.log_path.display()))?;
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
