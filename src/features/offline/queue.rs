//! Mutation queue storage.
//!
//! Holds the ordered list of pending mutations in memory and writes the whole
//! list back to its storage slot after every change.

use std::rc::Rc;

use tracing::{debug, error};

use super::mutation::{NewMutation, QueuedMutation};
use crate::core::Clock;
use crate::error::StudySyncError;
use crate::notify::{Notice, Notifier};
use crate::storage::KeyValueStore;

/// Ordered store of mutations waiting to be synced.
pub struct MutationQueue {
    store: Rc<dyn KeyValueStore>,
    key: String,
    clock: Rc<dyn Clock>,
    notifier: Rc<dyn Notifier>,
    mutations: Vec<QueuedMutation>,
}

impl MutationQueue {
    /// Load the queue persisted under `key`.
    ///
    /// A missing slot is an empty queue. So is an unreadable or corrupt one:
    /// the failure is logged and the queue starts empty.
    pub fn load(
        store: Rc<dyn KeyValueStore>,
        key: impl Into<String>,
        clock: Rc<dyn Clock>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        let key = key.into();
        let mutations = match read_persisted(store.as_ref(), &key) {
            Ok(mutations) => mutations,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to load offline queue");
                Vec::new()
            },
        };
        debug!(key = %key, pending = mutations.len(), "Loaded offline queue");

        Self {
            store,
            key,
            clock,
            notifier,
            mutations,
        }
    }

    /// Stamp `mutation`, append it, persist, and tell the user it will sync later.
    pub fn enqueue(&mut self, mutation: NewMutation) -> QueuedMutation {
        let queued = QueuedMutation::stamp(mutation, self.clock.now());
        debug!(
            id = %queued.id,
            entity = %queued.entity,
            kind = %queued.mutation_type,
            "Queued mutation"
        );

        self.mutations.push(queued.clone());
        self.persist();
        self.notifier.notify(&Notice::Queued);

        queued
    }

    /// Number of pending mutations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Pending mutations in insertion order.
    #[must_use]
    pub fn mutations(&self) -> &[QueuedMutation] {
        &self.mutations
    }

    /// Storage slot this queue persists to.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Drop every pending mutation and persist the empty queue.
    pub fn clear(&mut self) {
        debug!(dropped = self.mutations.len(), "Clearing offline queue");
        self.mutations.clear();
        self.persist();
    }

    /// Remove the mutations whose ids are listed, keeping the rest in order.
    ///
    /// Returns how many were removed. Persists only if something changed.
    pub fn remove(&mut self, ids: &[String]) -> usize {
        let before = self.mutations.len();
        self.mutations.retain(|m| !ids.contains(&m.id));
        let removed = before - self.mutations.len();

        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Write the full queue to storage. Failures are logged and dropped.
    fn persist(&self) {
        let result = serde_json::to_string(&self.mutations)
            .map_err(StudySyncError::from)
            .and_then(|json| self.store.set(&self.key, &json));

        if let Err(e) = result {
            error!(key = %self.key, error = %e, "Failed to save offline queue");
        }
    }
}

impl std::fmt::Debug for MutationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationQueue")
            .field("key", &self.key)
            .field("mutations", &self.mutations)
            .finish_non_exhaustive()
    }
}

fn read_persisted(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<QueuedMutation>, StudySyncError> {
    match store.get(key)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}
