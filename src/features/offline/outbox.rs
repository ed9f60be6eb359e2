//! Append-only outbox delegate.
//!
//! Stands in for the remote write: every pushed mutation becomes one JSON
//! line in a local file that another process can ship upstream.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::mutation::QueuedMutation;
use super::processor::SyncDelegate;
use crate::error::StudySyncError;

/// Sync delegate that appends mutations to a JSON-lines file.
#[derive(Debug, Clone)]
pub struct OutboxDelegate {
    path: PathBuf,
}

impl OutboxDelegate {
    /// Create a delegate writing to `path`. The file is created on first push.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the delegate appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every mutation written so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or a line is
    /// not a valid mutation.
    pub fn read_all(&self) -> Result<Vec<QueuedMutation>, StudySyncError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StudySyncError::from))
            .collect()
    }
}

impl SyncDelegate for OutboxDelegate {
    fn push(&self, mutation: &QueuedMutation) -> Result<(), StudySyncError> {
        let line = serde_json::to_string(mutation)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                StudySyncError::Sync(format!(
                    "Failed to open outbox {}: {e}",
                    self.path.display()
                ))
            })?;

        writeln!(file, "{line}")
            .map_err(|e| StudySyncError::Sync(format!("Failed to write outbox: {e}")))?;

        debug!(id = %mutation.id, path = %self.path.display(), "Wrote mutation to outbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::offline::mutation::NewMutation;
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_push_appends_lines_in_order() {
        let dir = TempDir::new().unwrap();
        let outbox = OutboxDelegate::new(dir.path().join("outbox.jsonl"));
        let a = QueuedMutation::stamp(NewMutation::create("comment", json!({"n": 1})), Utc::now());
        let b = QueuedMutation::stamp(NewMutation::delete("comment", json!({"n": 2})), Utc::now());

        outbox.push(&a).unwrap();
        outbox.push(&b).unwrap();

        let written = outbox.read_all().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].id, a.id);
        assert_eq!(written[1].id, b.id);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let outbox = OutboxDelegate::new(dir.path().join("never-written.jsonl"));
        assert!(outbox.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_unwritable_path_is_sync_error() {
        let dir = TempDir::new().unwrap();
        let outbox = OutboxDelegate::new(dir.path().join("missing-dir").join("outbox.jsonl"));
        let m = QueuedMutation::stamp(NewMutation::create("comment", json!({})), Utc::now());

        assert!(matches!(outbox.push(&m), Err(StudySyncError::Sync(_))));
    }
}
