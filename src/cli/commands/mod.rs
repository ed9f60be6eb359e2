//! Command implementations for studysync.
//!
//! Every command runs against a [`Context`] built once by `main`: the data
//! directory, loaded configuration and the SQLite key/value store.

mod network;
mod progress;
mod queue;
mod session;

pub use network::network;
pub use progress::progress;
pub use queue::queue;
pub use session::session;

use std::rc::Rc;

use crate::config::{Config, Paths};
use crate::core::{Clock, SystemClock};
use crate::error::StudySyncError;
use crate::features::offline::{ConnectionType, ManualConnectivity, OfflineManager, OutboxDelegate};
use crate::features::progress::ProgressTracker;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::storage::{Database, KeyValueStore};

/// Store key holding the simulated connectivity flag.
pub const NETWORK_ONLINE_KEY: &str = "network-online";

/// Store key holding the last reported connection type.
pub const NETWORK_CONNECTION_KEY: &str = "network-connection";

/// Shared state for a single CLI invocation.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    notifier: Rc<dyn Notifier>,
}

impl Context {
    /// Open the database under `paths` and build the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open(paths: Paths, config: Config) -> Result<Self, StudySyncError> {
        paths.ensure_dirs()?;
        let store = Database::open_at(&paths.database)?;

        Ok(Self::with_parts(
            paths,
            config,
            Rc::new(store),
            Rc::new(SystemClock),
            Rc::new(ConsoleNotifier),
        ))
    }

    /// Build a context from explicit parts.
    #[must_use]
    pub fn with_parts(
        paths: Paths,
        config: Config,
        store: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            paths,
            config,
            store,
            clock,
            notifier,
        }
    }

    /// The clock commands should read time from.
    #[must_use]
    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    /// Simulated connectivity as last set with `network online|offline`.
    ///
    /// Defaults to online with an unknown connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn connectivity(&self) -> Result<Rc<ManualConnectivity>, StudySyncError> {
        let online = self
            .store
            .get(NETWORK_ONLINE_KEY)?
            .map_or(true, |v| v.trim() != "false");
        let connection = self
            .store
            .get(NETWORK_CONNECTION_KEY)?
            .map_or(ConnectionType::Unknown, |v| ConnectionType::parse(&v));

        let connectivity = ManualConnectivity::new(online);
        connectivity.set_connection_type(connection);
        Ok(Rc::new(connectivity))
    }

    /// Persist the simulated connectivity.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_connectivity(
        &self,
        online: bool,
        connection: Option<ConnectionType>,
    ) -> Result<(), StudySyncError> {
        self.store
            .set(NETWORK_ONLINE_KEY, if online { "true" } else { "false" })?;
        if let Some(connection) = connection {
            self.store
                .set(NETWORK_CONNECTION_KEY, &connection.to_string())?;
        }
        Ok(())
    }

    /// Build the offline manager over `connectivity`, syncing to the outbox.
    #[must_use]
    pub fn offline_manager(&self, connectivity: Rc<ManualConnectivity>) -> OfflineManager {
        let outbox = OutboxDelegate::new(self.paths.data_file(&self.config.sync.outbox_file));

        OfflineManager::new(
            Rc::clone(&self.store),
            &self.config.sync.storage_key,
            Rc::clone(&self.clock),
            connectivity,
            Rc::new(outbox),
            Rc::clone(&self.notifier),
        )
    }

    /// Build the progress tracker.
    #[must_use]
    pub fn tracker(&self) -> ProgressTracker {
        ProgressTracker::new(Rc::clone(&self.store), Rc::clone(&self.clock))
    }
}
