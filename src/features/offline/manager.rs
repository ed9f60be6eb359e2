//! Offline manager.
//!
//! Composes the queue, processor and network observer into the one service
//! the application root constructs and hands to consumers.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::mutation::{NewMutation, QueuedMutation};
use super::network::{
    ConnectionType, ConnectivitySource, NetworkEvent, NetworkEvents, NetworkObserver, StatusBadge,
};
use super::processor::{DrainOutcome, QueueProcessor, SyncDelegate};
use super::queue::MutationQueue;
use crate::core::Clock;
use crate::notify::Notifier;
use crate::storage::KeyValueStore;

/// Snapshot of the queue and connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub online: bool,
    pub connection: ConnectionType,
    pub badge: Option<StatusBadge>,
    /// Timestamp of the oldest pending mutation
    pub oldest: Option<DateTime<Utc>>,
}

/// Offline queue service.
pub struct OfflineManager {
    queue: Rc<RefCell<MutationQueue>>,
    processor: Rc<QueueProcessor>,
    observer: Rc<NetworkObserver>,
    events: NetworkEvents,
}

impl OfflineManager {
    /// Load the queue from `store` and wire the processor and observer.
    ///
    /// The observer is subscribed to the manager's own event bus; publish
    /// platform transitions with [`OfflineManager::publish`].
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        storage_key: &str,
        clock: Rc<dyn Clock>,
        connectivity: Rc<dyn ConnectivitySource>,
        delegate: Rc<dyn SyncDelegate>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        let queue = Rc::new(RefCell::new(MutationQueue::load(
            store,
            storage_key,
            clock,
            Rc::clone(&notifier),
        )));
        let processor = Rc::new(QueueProcessor::new(
            Rc::clone(&connectivity),
            delegate,
            Rc::clone(&notifier),
        ));
        let observer = Rc::new(NetworkObserver::new(
            connectivity,
            Rc::clone(&processor),
            Rc::clone(&queue),
            notifier,
        ));

        let events = NetworkEvents::new();
        observer.attach(&events);

        Self {
            queue,
            processor,
            observer,
            events,
        }
    }

    /// Queue a write for later sync.
    pub fn queue_mutation(&self, mutation: NewMutation) -> QueuedMutation {
        self.queue.borrow_mut().enqueue(mutation)
    }

    /// Drain the queue now, if possible.
    pub fn process_queue(&self) -> DrainOutcome {
        self.processor.drain(&self.queue)
    }

    /// Number of pending mutations.
    #[must_use]
    pub fn queue_length(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Snapshot of pending mutations in order.
    #[must_use]
    pub fn pending(&self) -> Vec<QueuedMutation> {
        self.queue.borrow().mutations().to_vec()
    }

    /// Drop every pending mutation.
    pub fn clear_queue(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Whether a drain is in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processor.is_draining()
    }

    /// Live connectivity from the platform.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.observer.is_online()
    }

    /// Last link type reported on the bus.
    #[must_use]
    pub fn connection_type(&self) -> ConnectionType {
        self.observer.connection_type()
    }

    /// Deliver a connectivity transition to every subscriber.
    ///
    /// Returns the drain outcome when the event triggered one.
    pub fn publish(&self, event: NetworkEvent) -> Option<DrainOutcome> {
        self.events.publish(&event);

        match event {
            NetworkEvent::Online => self.observer.last_drain(),
            NetworkEvent::Offline | NetworkEvent::ConnectionChanged(_) => None,
        }
    }

    /// Event bus other components may subscribe to.
    #[must_use]
    pub const fn events(&self) -> &NetworkEvents {
        &self.events
    }

    /// Current status badge.
    #[must_use]
    pub fn badge(&self) -> Option<StatusBadge> {
        self.observer.refresh_badge()
    }

    /// Pending count, connectivity and badge in one snapshot.
    #[must_use]
    pub fn status(&self) -> QueueStatus {
        let oldest = self
            .queue
            .borrow()
            .mutations()
            .iter()
            .map(|m| m.timestamp)
            .min();

        QueueStatus {
            pending: self.queue_length(),
            online: self.is_online(),
            connection: self.connection_type(),
            badge: self.badge(),
            oldest,
        }
    }
}

impl std::fmt::Debug for OfflineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineManager")
            .field("queue", &self.queue)
            .field("draining", &self.processor.is_draining())
            .finish_non_exhaustive()
    }
}
