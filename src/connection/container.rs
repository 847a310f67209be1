/*!
 * Scoped Connection Containers
 * Aggregate handle ownership and receiver-driven invalidation
 */

use super::handle::{Connection, ScopedConnection};
use parking_lot::Mutex;
use std::fmt;

/// Owns a set of scoped handles; every contained slot is disconnected
/// when the container is dropped or on [`disconnect_all`].
///
/// [`disconnect_all`]: ScopedConnectionContainer::disconnect_all
#[derive(Default)]
pub struct ScopedConnectionContainer {
    connections: Mutex<Vec<ScopedConnection>>,
}

impl ScopedConnectionContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take scoped ownership of a handle.
    pub fn append(&self, conn: Connection) {
        self.connections.lock().push(ScopedConnection::from(conn));
    }

    /// Disconnect and drop every contained handle.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}

impl fmt::Debug for ScopedConnectionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedConnectionContainer")
            .field("len", &self.len())
            .finish()
    }
}

/// Capability for receivers that invalidate their slots on destruction.
///
/// Embed a [`ScopedConnectionContainer`] and return it from
/// [`tracked_connections`](Trackable::tracked_connections); connections
/// registered through
/// [`connect_tracked`](crate::signal::Signal::connect_tracked) (or
/// [`add_tracked_connection`](Trackable::add_tracked_connection)) are
/// disconnected when the receiver is dropped, before its slots could be
/// invoked again.
pub trait Trackable {
    fn tracked_connections(&self) -> &ScopedConnectionContainer;

    fn add_tracked_connection(&self, conn: Connection) {
        self.tracked_connections().append(conn);
    }
}
