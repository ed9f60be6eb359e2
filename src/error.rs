//! Error types for studysync.

use thiserror::Error;

/// Errors raised at the boundaries of the crate.
///
/// The queue and progress cores absorb these (logging them) rather than
/// returning them to their callers; they surface from storage, config,
/// sync delegates and the CLI.
#[derive(Debug, Error)]
pub enum StudySyncError {
    /// Configuration could not be read, parsed or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The SQLite database failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A key/value store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A mutation could not be pushed to the remote system.
    #[error("Sync failed: {0}")]
    Sync(String),

    /// A requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied an invalid value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StudySyncError {
    /// Process exit code for this error when it reaches `main`.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::NotFound(_) => 3,
            Self::Config(_) => 4,
            _ => 1,
        }
    }
}
