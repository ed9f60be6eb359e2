//! `SQLite` database connection and operations.
//!
//! The database is stored at `~/.studysync/studysync.db` and holds a single
//! `kv_store` table backing the [`KeyValueStore`](super::KeyValueStore) trait:
//! - the persisted offline mutation queue
//! - per-user course progress records and enrollment indexes
//! - the CLI's simulated connectivity flag

use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Paths;
use crate::error::StudySyncError;

use super::migrations;
use super::KeyValueStore;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, StudySyncError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StudySyncError> {
        let conn = Connection::open(path).map_err(|e| {
            StudySyncError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, StudySyncError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            StudySyncError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Run database migrations.
    fn migrate(&self) -> Result<(), StudySyncError> {
        migrations::run(&self.conn)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, StudySyncError> {
        migrations::get_version(&self.conn)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StudySyncError> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| StudySyncError::Database(format!("Failed to read key {key}: {e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StudySyncError> {
        self.conn
            .execute(
                r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                 updated_at = excluded.updated_at",
                params![key, value, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(|e| StudySyncError::Database(format!("Failed to write key {key}: {e}")))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StudySyncError> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map_err(|e| StudySyncError::Database(format!("Failed to delete key {key}: {e}")))?;
        Ok(rows > 0)
    }
}
