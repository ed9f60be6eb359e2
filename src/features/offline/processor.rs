//! Queue processing.
//!
//! Drains the mutation queue through a [`SyncDelegate`], one mutation at a
//! time in insertion order, stopping at the first failure.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, warn};

use super::mutation::QueuedMutation;
use super::network::ConnectivitySource;
use super::queue::MutationQueue;
use crate::error::StudySyncError;
use crate::notify::{Notice, Notifier};

/// Applies a queued mutation to the remote system of record.
#[cfg_attr(test, mockall::automock)]
pub trait SyncDelegate {
    /// Push one mutation. Any error stops the current drain.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation was not applied.
    fn push(&self, mutation: &QueuedMutation) -> Result<(), StudySyncError>;
}

/// Why a drain returned without processing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another drain is in flight.
    AlreadyDraining,
    /// Nothing is queued.
    EmptyQueue,
    /// The platform reports no connectivity.
    Offline,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyDraining => write!(f, "a sync is already running"),
            Self::EmptyQueue => write!(f, "no pending changes"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// The mutation that stopped a drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainFailure {
    pub mutation_id: String,
    pub entity: String,
    pub error: String,
}

/// Result of a drain pass that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Mutations pushed and removed from the queue
    pub synced: usize,
    /// Mutations still queued afterwards
    pub remaining: usize,
    /// Set when the pass stopped early
    pub failure: Option<DrainFailure>,
}

/// Outcome of [`QueueProcessor::drain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrainOutcome {
    Skipped { reason: SkipReason },
    Completed(DrainReport),
}

impl DrainOutcome {
    /// Number of mutations removed by this call.
    #[must_use]
    pub const fn synced(&self) -> usize {
        match self {
            Self::Skipped { .. } => 0,
            Self::Completed(report) => report.synced,
        }
    }
}

/// Clears the draining flag however the drain exits.
struct DrainGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DrainGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Serial, stop-on-first-failure queue drainer.
pub struct QueueProcessor {
    connectivity: Rc<dyn ConnectivitySource>,
    delegate: Rc<dyn SyncDelegate>,
    notifier: Rc<dyn Notifier>,
    draining: Cell<bool>,
}

impl QueueProcessor {
    /// Create an idle processor.
    #[must_use]
    pub fn new(
        connectivity: Rc<dyn ConnectivitySource>,
        delegate: Rc<dyn SyncDelegate>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            connectivity,
            delegate,
            notifier,
            draining: Cell::new(false),
        }
    }

    /// Whether a drain is in flight.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    /// Push every queued mutation in order until one fails.
    ///
    /// Mutations pushed before the failure are removed and the queue is
    /// persisted; the failing one and everything after it stay queued.
    /// Calls made while a drain is running return immediately and are not
    /// retried.
    ///
    /// No queue borrow is held while the delegate runs, so a delegate may
    /// enqueue (or even call `drain`) without panicking.
    pub fn drain(&self, queue: &RefCell<MutationQueue>) -> DrainOutcome {
        if self.draining.get() {
            debug!("Drain requested while another is running; dropping request");
            return DrainOutcome::Skipped {
                reason: SkipReason::AlreadyDraining,
            };
        }

        let pending: Vec<QueuedMutation> = {
            let queue = queue.borrow();
            if queue.is_empty() {
                return DrainOutcome::Skipped {
                    reason: SkipReason::EmptyQueue,
                };
            }
            queue.mutations().to_vec()
        };

        if !self.connectivity.is_online() {
            debug!(pending = pending.len(), "Offline; leaving queue untouched");
            return DrainOutcome::Skipped {
                reason: SkipReason::Offline,
            };
        }

        let _guard = DrainGuard::engage(&self.draining);
        debug!(pending = pending.len(), "Draining offline queue");

        let mut processed: Vec<String> = Vec::with_capacity(pending.len());
        let mut failure = None;

        for mutation in &pending {
            match self.delegate.push(mutation) {
                Ok(()) => processed.push(mutation.id.clone()),
                Err(e) => {
                    warn!(
                        id = %mutation.id,
                        entity = %mutation.entity,
                        error = %e,
                        "Failed to process mutation; stopping drain"
                    );
                    failure = Some(DrainFailure {
                        mutation_id: mutation.id.clone(),
                        entity: mutation.entity.clone(),
                        error: e.to_string(),
                    });
                    break;
                },
            }
        }

        let (synced, remaining) = {
            let mut queue = queue.borrow_mut();
            let synced = queue.remove(&processed);
            (synced, queue.len())
        };

        if synced > 0 {
            self.notifier.notify(&Notice::Synced { count: synced });
        }

        DrainOutcome::Completed(DrainReport {
            synced,
            remaining,
            failure,
        })
    }
}
