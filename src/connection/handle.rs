/*!
 * Connection Handles
 * User-visible currency for slot lifetime management
 */

use super::node::ConnectionNode;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::Arc;

/// Handle to one signal/slot binding.
///
/// Cloning shares ownership of the underlying node; the node outlives its
/// list membership for as long as any handle (or in-flight emission)
/// holds it. A handle to a disconnected node stays valid to query:
/// `is_connected` reports false, `block`/`unblock` still toggle the flag.
/// The default handle is empty and reports false on every query.
#[derive(Clone, Default)]
pub struct Connection {
    node: Option<Arc<dyn ConnectionNode>>,
}

impl Connection {
    /// An empty handle, equal to any other empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_node(node: Arc<dyn ConnectionNode>) -> Self {
        Self { node: Some(node) }
    }

    pub(crate) fn node(&self) -> Option<&Arc<dyn ConnectionNode>> {
        self.node.as_ref()
    }

    /// Whether the slot is still linked into its signal.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.node.as_ref().map(|n| n.is_connected()).unwrap_or(false)
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.node.as_ref().map(|n| n.is_blocked()).unwrap_or(false)
    }

    /// Skip this slot during emission without removing it.
    pub fn block(&self) {
        if let Some(node) = &self.node {
            node.block();
        }
    }

    pub fn unblock(&self) {
        if let Some(node) = &self.node {
            node.unblock();
        }
    }

    /// Unlink the slot from its signal and release this handle's node
    /// reference. Other handles to the same node observe
    /// `is_connected() == false` from then on.
    pub fn disconnect(&mut self) {
        if let Some(node) = self.node.take() {
            node.disconnect();
        }
    }

    pub fn swap(&mut self, other: &mut Connection) {
        std::mem::swap(&mut self.node, &mut other.node);
    }

    fn node_addr(&self) -> *const () {
        self.node
            .as_ref()
            .map(|n| Arc::as_ptr(n) as *const ())
            .unwrap_or(ptr::null())
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.node_addr() == other.node_addr()
    }
}

impl Eq for Connection {}

impl PartialOrd for Connection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Connection {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node_addr().cmp(&other.node_addr())
    }
}

impl Hash for Connection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_addr().hash(state);
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.is_connected())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// A connection handle that disconnects its slot when dropped.
///
/// Non-cloneable; use [`release`](ScopedConnection::release) to escape
/// the scope with the slot still connected.
#[derive(Default)]
pub struct ScopedConnection {
    conn: Connection,
}

impl ScopedConnection {
    /// Detach the underlying handle without disconnecting the slot.
    pub fn release(&mut self) -> Connection {
        std::mem::take(&mut self.conn)
    }
}

impl From<Connection> for ScopedConnection {
    fn from(conn: Connection) -> Self {
        Self { conn }
    }
}

impl std::ops::Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.conn.disconnect();
    }
}

impl fmt::Debug for ScopedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopedConnection").field(&self.conn).finish()
    }
}

/// Guard that blocks a connection for the duration of a scope.
///
/// Sets the blocked flag on construction only if it was clear and
/// restores it on drop only if this guard set it, so nesting blockers is
/// idempotent.
pub struct ConnectionBlocker {
    conn: Option<Connection>,
}

impl ConnectionBlocker {
    pub fn new(conn: &Connection) -> Self {
        let blocked_here = conn
            .node()
            .map(|node| node.try_block())
            .unwrap_or(false);
        Self {
            conn: blocked_here.then(|| conn.clone()),
        }
    }
}

impl Drop for ConnectionBlocker {
    fn drop(&mut self) {
        if let Some(conn) = &self.conn {
            conn.unblock();
        }
    }
}
