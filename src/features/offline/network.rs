//! Connectivity tracking.
//!
//! The platform reports connectivity through a [`ConnectivitySource`] and
//! publishes transitions on a [`NetworkEvents`] bus owned by the composing
//! application. The [`NetworkObserver`] reacts to those transitions: it tells
//! the user what happened and replays the queue when the device comes back.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::processor::{DrainOutcome, QueueProcessor};
use super::queue::MutationQueue;
use crate::error::StudySyncError;
use crate::notify::{Notice, Notifier};

/// Kind of link the device is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Wifi,
    Cellular,
    Ethernet,
    None,
    #[default]
    Unknown,
}

impl ConnectionType {
    /// Parse a platform connection label. Unrecognized labels are `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "wifi" | "wi-fi" => Self::Wifi,
            "cellular" | "4g" | "3g" | "2g" | "slow-2g" | "5g" => Self::Cellular,
            "ethernet" | "wired" => Self::Ethernet,
            "none" => Self::None,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Wifi => "wifi",
            Self::Cellular => "cellular",
            Self::Ethernet => "ethernet",
            Self::None => "none",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Live connectivity as reported by the platform.
pub trait ConnectivitySource {
    /// Whether the device is online right now.
    fn is_online(&self) -> bool;

    /// Current link type, when the platform knows it.
    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Unknown
    }
}

/// A connectivity source whose state is set explicitly.
#[derive(Debug)]
pub struct ManualConnectivity {
    online: Cell<bool>,
    connection: Cell<ConnectionType>,
}

impl ManualConnectivity {
    /// Create a source starting in the given state.
    #[must_use]
    pub const fn new(online: bool) -> Self {
        Self {
            online: Cell::new(online),
            connection: Cell::new(ConnectionType::Unknown),
        }
    }

    /// Flip the online flag.
    pub fn set_online(&self, online: bool) {
        self.online.set(online);
    }

    /// Record the link type.
    pub fn set_connection_type(&self, connection: ConnectionType) {
        self.connection.set(connection);
    }
}

impl ConnectivitySource for ManualConnectivity {
    fn is_online(&self) -> bool {
        self.online.get()
    }

    fn connection_type(&self) -> ConnectionType {
        self.connection.get()
    }
}

/// A connectivity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    Online,
    Offline,
    ConnectionChanged(ConnectionType),
}

impl NetworkEvent {
    /// Parse a CLI/platform event name.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown event names.
    pub fn parse(s: &str) -> Result<Self, StudySyncError> {
        match s.trim().to_lowercase().as_str() {
            "online" | "on" | "up" => Ok(Self::Online),
            "offline" | "off" | "down" => Ok(Self::Offline),
            other => Err(StudySyncError::InvalidInput(format!(
                "Unknown network event '{other}' (expected online or offline)"
            ))),
        }
    }
}

/// Handle returned by [`NetworkEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&NetworkEvent)>;

/// Typed event bus for connectivity transitions.
#[derive(Default)]
pub struct NetworkEvents {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, Handler)>>,
}

impl NetworkEvents {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every subsequent event.
    pub fn subscribe(&self, handler: impl Fn(&NetworkEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Deliver `event` to every handler registered at the time of the call.
    pub fn publish(&self, event: &NetworkEvent) {
        let handlers: Vec<Handler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }
}

/// Connectivity badge shown next to navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "pending", rename_all = "lowercase")]
pub enum StatusBadge {
    /// Device is offline.
    Offline,
    /// Online with mutations still waiting.
    Pending(usize),
}

impl std::fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => write!(f, "Offline"),
            Self::Pending(n) => write!(f, "{n} pending"),
        }
    }
}

/// Badge for the given state; `None` when online with nothing pending.
#[must_use]
pub const fn status_badge(online: bool, pending: usize) -> Option<StatusBadge> {
    if !online {
        Some(StatusBadge::Offline)
    } else if pending > 0 {
        Some(StatusBadge::Pending(pending))
    } else {
        None
    }
}

/// Reacts to connectivity transitions.
pub struct NetworkObserver {
    connectivity: Rc<dyn ConnectivitySource>,
    processor: Rc<QueueProcessor>,
    queue: Rc<RefCell<MutationQueue>>,
    notifier: Rc<dyn Notifier>,
    badge_pending: Cell<usize>,
    last_connection: Cell<ConnectionType>,
    last_drain: RefCell<Option<DrainOutcome>>,
}

impl NetworkObserver {
    /// Build an observer over the shared queue and processor.
    #[must_use]
    pub fn new(
        connectivity: Rc<dyn ConnectivitySource>,
        processor: Rc<QueueProcessor>,
        queue: Rc<RefCell<MutationQueue>>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        let last_connection = Cell::new(connectivity.connection_type());
        Self {
            connectivity,
            processor,
            queue,
            notifier,
            badge_pending: Cell::new(0),
            last_connection,
            last_drain: RefCell::new(None),
        }
    }

    /// Subscribe this observer to `bus`.
    ///
    /// The bus holds only a weak reference; dropping the last `Rc` to the
    /// observer silently ends the subscription's effect.
    pub fn attach(self: &Rc<Self>, bus: &NetworkEvents) -> SubscriptionId {
        let weak: Weak<Self> = Rc::downgrade(self);
        bus.subscribe(move |event| {
            if let Some(observer) = weak.upgrade() {
                observer.handle(event);
            }
        })
    }

    /// React to one transition. Returns the drain outcome for `Online`.
    pub fn handle(&self, event: &NetworkEvent) -> Option<DrainOutcome> {
        match event {
            NetworkEvent::Online => {
                debug!("Connectivity restored");
                self.badge_pending.set(0);
                self.notifier.notify(&Notice::BackOnline);
                let outcome = self.processor.drain(&self.queue);
                *self.last_drain.borrow_mut() = Some(outcome.clone());
                Some(outcome)
            },
            NetworkEvent::Offline => {
                debug!("Connectivity lost");
                self.notifier.notify(&Notice::Offline);
                None
            },
            NetworkEvent::ConnectionChanged(connection) => {
                debug!(connection = %connection, "Connection type changed");
                self.last_connection.set(*connection);
                None
            },
        }
    }

    /// Ground-truth connectivity, read from the platform on every call.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Most recently reported link type.
    #[must_use]
    pub fn connection_type(&self) -> ConnectionType {
        self.last_connection.get()
    }

    /// Outcome of the drain triggered by the most recent `Online` event.
    #[must_use]
    pub fn last_drain(&self) -> Option<DrainOutcome> {
        self.last_drain.borrow().clone()
    }

    /// Re-read the pending count from the queue and return the badge.
    pub fn refresh_badge(&self) -> Option<StatusBadge> {
        self.badge_pending.set(self.queue.borrow().len());
        self.badge()
    }

    /// Badge from the last refreshed pending count.
    #[must_use]
    pub fn badge(&self) -> Option<StatusBadge> {
        status_badge(self.is_online(), self.badge_pending.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::features::offline::mutation::{NewMutation, QueuedMutation};
    use crate::features::offline::processor::{SkipReason, SyncDelegate};
    use crate::notify::NoticeLog;
    use crate::storage::MemoryStore;
    use serde_json::json;

    struct AcceptAll {
        pushed: RefCell<Vec<String>>,
    }

    impl SyncDelegate for AcceptAll {
        fn push(&self, mutation: &QueuedMutation) -> Result<(), StudySyncError> {
            self.pushed.borrow_mut().push(mutation.id.clone());
            Ok(())
        }
    }

    struct Harness {
        connectivity: Rc<ManualConnectivity>,
        queue: Rc<RefCell<MutationQueue>>,
        log: Rc<NoticeLog>,
        delegate: Rc<AcceptAll>,
        observer: Rc<NetworkObserver>,
    }

    fn harness(online: bool) -> Harness {
        let connectivity = Rc::new(ManualConnectivity::new(online));
        let log = Rc::new(NoticeLog::new());
        let queue = Rc::new(RefCell::new(MutationQueue::load(
            Rc::new(MemoryStore::new()),
            "q",
            Rc::new(ManualClock::default()),
            log.clone(),
        )));
        let delegate = Rc::new(AcceptAll {
            pushed: RefCell::new(Vec::new()),
        });
        let processor = Rc::new(QueueProcessor::new(
            connectivity.clone(),
            delegate.clone(),
            log.clone(),
        ));
        let observer = Rc::new(NetworkObserver::new(
            connectivity.clone(),
            processor,
            queue.clone(),
            log.clone(),
        ));

        Harness {
            connectivity,
            queue,
            log,
            delegate,
            observer,
        }
    }

    #[test]
    fn test_badge_states() {
        assert_eq!(status_badge(true, 0), None);
        assert_eq!(status_badge(true, 2), Some(StatusBadge::Pending(2)));
        assert_eq!(status_badge(false, 0), Some(StatusBadge::Offline));
        assert_eq!(status_badge(false, 5), Some(StatusBadge::Offline));
        assert_eq!(StatusBadge::Pending(2).to_string(), "2 pending");
    }

    #[test]
    fn test_connection_type_parse() {
        assert_eq!(ConnectionType::parse("4g"), ConnectionType::Cellular);
        assert_eq!(ConnectionType::parse("WiFi"), ConnectionType::Wifi);
        assert_eq!(ConnectionType::parse("satellite"), ConnectionType::Unknown);
    }

    #[test]
    fn test_bus_delivers_and_unsubscribes() {
        let bus = NetworkEvents::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        let id = bus.subscribe(move |e| sink.borrow_mut().push(*e));
        bus.publish(&NetworkEvent::Offline);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&NetworkEvent::Online);

        assert_eq!(*seen.borrow(), vec![NetworkEvent::Offline]);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_offline_transition_only_notifies() {
        let h = harness(false);
        h.queue
            .borrow_mut()
            .enqueue(NewMutation::create("comment", json!({})));
        h.log.take();

        assert!(h.observer.handle(&NetworkEvent::Offline).is_none());

        assert_eq!(h.log.notices(), vec![Notice::Offline]);
        assert_eq!(h.queue.borrow().len(), 1);
    }

    #[test]
    fn test_online_transition_drains_once() {
        let h = harness(false);
        h.queue
            .borrow_mut()
            .enqueue(NewMutation::create("comment", json!({})));
        h.queue
            .borrow_mut()
            .enqueue(NewMutation::update("profile", json!({})));
        h.log.take();

        h.connectivity.set_online(true);
        let outcome = h.observer.handle(&NetworkEvent::Online);

        assert!(matches!(outcome, Some(DrainOutcome::Completed(ref r)) if r.synced == 2));
        assert_eq!(h.delegate.pushed.borrow().len(), 2);
        assert_eq!(
            h.log.notices(),
            vec![Notice::BackOnline, Notice::Synced { count: 2 }]
        );
        assert!(h.queue.borrow().is_empty());
    }

    #[test]
    fn test_online_event_with_stale_platform_state_does_not_drain() {
        let h = harness(false);
        h.queue
            .borrow_mut()
            .enqueue(NewMutation::create("comment", json!({})));

        let outcome = h.observer.handle(&NetworkEvent::Online);

        assert_eq!(
            outcome,
            Some(DrainOutcome::Skipped {
                reason: SkipReason::Offline
            })
        );
        assert_eq!(h.queue.borrow().len(), 1);
    }

    #[test]
    fn test_attach_routes_bus_events() {
        let h = harness(true);
        let bus = NetworkEvents::new();
        h.observer.attach(&bus);
        h.queue
            .borrow_mut()
            .enqueue(NewMutation::create("comment", json!({})));

        bus.publish(&NetworkEvent::ConnectionChanged(ConnectionType::Wifi));
        bus.publish(&NetworkEvent::Online);

        assert_eq!(h.observer.connection_type(), ConnectionType::Wifi);
        assert!(h.queue.borrow().is_empty());
        assert_eq!(h.observer.last_drain().map(|o| o.synced()), Some(1));
    }

    #[test]
    fn test_is_online_reads_ground_truth() {
        let h = harness(true);
        assert!(h.observer.is_online());

        // No event published: the observer still sees the platform flag.
        h.connectivity.set_online(false);
        assert!(!h.observer.is_online());
    }

    #[test]
    fn test_online_resets_badge_counter() {
        let h = harness(false);
        h.queue
            .borrow_mut()
            .enqueue(NewMutation::create("comment", json!({})));

        assert_eq!(h.observer.refresh_badge(), Some(StatusBadge::Offline));

        h.connectivity.set_online(true);
        assert_eq!(h.observer.badge(), Some(StatusBadge::Pending(1)));

        h.observer.handle(&NetworkEvent::Online);
        assert_eq!(h.observer.badge(), None);
        assert_eq!(h.observer.refresh_badge(), None);
    }
}
