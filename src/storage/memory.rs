//! In-memory key/value store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::StudySyncError;

/// A [`KeyValueStore`] held entirely in memory.
///
/// Writes can be switched off with [`MemoryStore::set_read_only`] to
/// exercise the persistence-failure paths of the cores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    fn check_writable(&self, key: &str) -> Result<(), StudySyncError> {
        if self.read_only.get() {
            return Err(StudySyncError::Storage(format!(
                "store is read-only, cannot write {key}"
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StudySyncError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StudySyncError> {
        self.check_writable(key)?;
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StudySyncError> {
        self.check_writable(key)?;
        Ok(self.slots.borrow_mut().remove(key).is_some())
    }
}
