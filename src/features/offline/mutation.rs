//! Mutation types for the offline queue.
//!
//! Defines the pending write operations the queue stores and their
//! persisted JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StudySyncError;

/// Kind of write a mutation performs on its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationType {
    /// Create a new record
    Create,
    /// Update an existing record
    Update,
    /// Delete a record
    Delete,
}

impl MutationType {
    /// Parse from the persisted/CLI spelling.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than create, update or delete.
    pub fn parse(s: &str) -> Result<Self, StudySyncError> {
        match s.trim().to_lowercase().as_str() {
            "create" | "c" => Ok(Self::Create),
            "update" | "u" => Ok(Self::Update),
            "delete" | "d" => Ok(Self::Delete),
            other => Err(StudySyncError::InvalidInput(format!(
                "Unknown mutation type '{other}' (expected create, update or delete)"
            ))),
        }
    }

    /// Get the display name for this mutation type.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for MutationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A write the caller wants applied, before the queue stamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMutation {
    #[serde(rename = "type")]
    pub mutation_type: MutationType,
    /// Target resource name, e.g. `comment` or `enrollment`
    pub entity: String,
    /// Opaque payload handed to the sync delegate
    pub data: serde_json::Value,
}

impl NewMutation {
    /// Build a new mutation.
    #[must_use]
    pub fn new(
        mutation_type: MutationType,
        entity: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            mutation_type,
            entity: entity.into(),
            data,
        }
    }

    /// Shorthand for a create.
    #[must_use]
    pub fn create(entity: impl Into<String>, data: serde_json::Value) -> Self {
        Self::new(MutationType::Create, entity, data)
    }

    /// Shorthand for an update.
    #[must_use]
    pub fn update(entity: impl Into<String>, data: serde_json::Value) -> Self {
        Self::new(MutationType::Update, entity, data)
    }

    /// Shorthand for a delete.
    #[must_use]
    pub fn delete(entity: impl Into<String>, data: serde_json::Value) -> Self {
        Self::new(MutationType::Delete, entity, data)
    }
}

/// A mutation waiting in the queue.
///
/// Serialized as `{ id, type, entity, data, timestamp }` with the timestamp in
/// epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMutation {
    pub id: String,
    #[serde(rename = "type")]
    pub mutation_type: MutationType,
    pub entity: String,
    pub data: serde_json::Value,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl QueuedMutation {
    /// Stamp `mutation` with a fresh id and the given time.
    #[must_use]
    pub fn stamp(mutation: NewMutation, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mutation_type: mutation.mutation_type,
            entity: mutation.entity,
            data: mutation.data,
            timestamp,
        }
    }
}
