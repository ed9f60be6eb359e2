//! Storage layer for studysync.
//!
//! All persistence goes through the narrow [`KeyValueStore`] trait so the
//! queue and progress cores can run against SQLite in the CLI and against
//! [`MemoryStore`] in tests.

mod database;
mod memory;
mod migrations;

pub use database::Database;
pub use memory::MemoryStore;

use crate::error::StudySyncError;

/// A keyed slot store holding whole serialized documents.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StudySyncError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StudySyncError>;

    /// Remove `key`. Returns whether a value was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<bool, StudySyncError>;
}
