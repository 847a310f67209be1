/*!
 * Emission Context
 * Per-thread {current connection, abort flag} with stack-scoped guards
 */

use crate::connection::node::ConnectionNode;
use crate::connection::Connection;
use std::cell::RefCell;
use std::sync::Arc;

struct EmissionContext {
    current: Option<Arc<dyn ConnectionNode>>,
    aborted: bool,
}

thread_local! {
    static CONTEXT: RefCell<EmissionContext> = RefCell::new(EmissionContext {
        current: None,
        aborted: false,
    });
}

/// Handle to the currently executing slot's connection.
///
/// Valid only inside a slot invocation; anywhere else this returns an
/// empty handle. A slot can use it to query or disconnect itself:
///
/// ```ignore
/// signal.connect(|_: &()| current_connection().disconnect());
/// ```
pub fn current_connection() -> Connection {
    CONTEXT.with(|ctx| {
        ctx.borrow()
            .current
            .clone()
            .map(Connection::from_node)
            .unwrap_or_default()
    })
}

/// Abort the innermost emission on this thread.
///
/// Remaining slots are skipped for the current emission only; nothing is
/// disconnected. Outside an emission this is a no-op.
pub fn abort_emission() {
    CONTEXT.with(|ctx| ctx.borrow_mut().aborted = true);
}

pub(crate) fn emission_aborted() -> bool {
    CONTEXT.with(|ctx| ctx.borrow().aborted)
}

/// Saves the abort flag on entry, resets it for the new emission, and
/// restores the outer value on drop. Nested emissions each get their own
/// flag; the restore runs even when a slot panics.
pub(crate) struct AbortScope {
    prev: bool,
}

impl AbortScope {
    pub fn enter() -> Self {
        let prev = CONTEXT.with(|ctx| std::mem::replace(&mut ctx.borrow_mut().aborted, false));
        Self { prev }
    }
}

impl Drop for AbortScope {
    fn drop(&mut self) {
        let prev = self.prev;
        CONTEXT.with(|ctx| ctx.borrow_mut().aborted = prev);
    }
}

/// Publishes the executing slot's node for `current_connection` and
/// restores the previous one on drop (re-entrant emissions nest).
pub(crate) struct ConnectionScope {
    prev: Option<Arc<dyn ConnectionNode>>,
}

impl ConnectionScope {
    pub fn enter(node: Arc<dyn ConnectionNode>) -> Self {
        let prev = CONTEXT.with(|ctx| ctx.borrow_mut().current.replace(node));
        Self { prev }
    }
}

impl Drop for ConnectionScope {
    fn drop(&mut self) {
        let prev = self.prev.take();
        CONTEXT.with(|ctx| ctx.borrow_mut().current = prev);
    }
}
