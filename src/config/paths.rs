//! Path resolution for studysync configuration and data files.
//!
//! All studysync data is stored in `~/.studysync/` unless `STUDYSYNC_HOME`
//! points elsewhere:
//! - `config.yaml` - Main configuration file
//! - `studysync.db` - SQLite key/value store (queue, progress)
//! - `outbox.jsonl` - Mutations pushed by the outbox sync delegate

use std::path::PathBuf;

use crate::error::StudySyncError;

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "STUDYSYNC_HOME";

/// Paths to studysync configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.studysync/`
    pub root: PathBuf,
    /// Config file: `~/.studysync/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.studysync/studysync.db`
    pub database: PathBuf,
}

impl Paths {
    /// Resolve paths from `STUDYSYNC_HOME`, falling back to `$HOME/.studysync`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, StudySyncError> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            StudySyncError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".studysync")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("studysync.db"),
            root,
        }
    }

    /// Resolve a data file name relative to the root.
    #[must_use]
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Ensure the root directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), StudySyncError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                StudySyncError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}
