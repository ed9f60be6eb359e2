//! Offline mutation queue.
//!
//! Writes made while the device is offline are stored locally as
//! [`QueuedMutation`]s and replayed in order by the [`QueueProcessor`] once
//! connectivity returns. [`OfflineManager`] wires the pieces together.

mod manager;
mod mutation;
mod network;
mod outbox;
mod processor;
mod queue;

pub use manager::{OfflineManager, QueueStatus};
pub use mutation::{MutationType, NewMutation, QueuedMutation};
pub use network::{
    status_badge, ConnectionType, ConnectivitySource, ManualConnectivity, NetworkEvent,
    NetworkEvents, NetworkObserver, StatusBadge, SubscriptionId,
};
pub use outbox::OutboxDelegate;
pub use processor::{
    DrainFailure, DrainOutcome, DrainReport, QueueProcessor, SkipReason, SyncDelegate,
};
pub use queue::MutationQueue;

/// Storage slot the queue persists to unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "offline_mutation_queue";
