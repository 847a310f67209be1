/*!
 * Connection Nodes
 * Reference-counted slot-list nodes shared between signals and handles
 */

use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

/// Reference-counted mutex shared between a signal and its nodes.
///
/// Nodes keep the lock alive, so handle-side `disconnect` and `block`
/// remain well-defined after the signal itself has been dropped.
pub(crate) type SharedLock = Arc<Mutex<()>>;

/// The erased slot callable.
pub(crate) type SlotFn<A, R> = Box<dyn Fn(&A) -> R + Send + Sync>;

/// Object-safe node operations backing the type-erased [`Connection`]
/// handle. Implemented by every slot node regardless of signature or
/// threading policy.
///
/// [`Connection`]: crate::connection::Connection
pub(crate) trait ConnectionNode: Send + Sync {
    fn is_connected(&self) -> bool;
    fn is_blocked(&self) -> bool;
    fn block(&self);
    /// Set the blocked flag only if it was clear; true when this call set it.
    fn try_block(&self) -> bool;
    fn unblock(&self);
    fn disconnect(&self);
}

pub(crate) struct NodeLinks<A, R> {
    pub prev: Option<Weak<SlotNode<A, R>>>,
    pub next: Option<Arc<SlotNode<A, R>>>,
}

/// A slot-list node.
///
/// `links.prev == None` marks the node as disconnected (a tombstone);
/// `links.next` is preserved on disconnect so in-flight emissions can
/// still advance past it. The link fields sit behind a per-node mutex so
/// handle-side queries never need the signal's lock; all multi-node link
/// mutations serialize on the shared signal lock first.
pub(crate) struct SlotNode<A, R> {
    links: Mutex<NodeLinks<A, R>>,
    blocked: AtomicBool,
    /// Thread that must execute this slot; `None` means any thread.
    owner: Option<ThreadId>,
    lock: SharedLock,
    /// `None` only in the head/tail sentinels.
    slot: Option<SlotFn<A, R>>,
}

impl<A, R> SlotNode<A, R> {
    pub fn sentinel(lock: SharedLock) -> Arc<Self> {
        Arc::new(Self {
            links: Mutex::new(NodeLinks {
                prev: None,
                next: None,
            }),
            blocked: AtomicBool::new(false),
            owner: None,
            lock,
            slot: None,
        })
    }

    pub fn new(slot: SlotFn<A, R>, owner: Option<ThreadId>, lock: SharedLock) -> Arc<Self> {
        Arc::new(Self {
            links: Mutex::new(NodeLinks {
                prev: None,
                next: None,
            }),
            blocked: AtomicBool::new(false),
            owner,
            lock,
            slot: Some(slot),
        })
    }

    #[inline]
    pub fn next(&self) -> Option<Arc<Self>> {
        self.links.lock().next.clone()
    }

    #[inline]
    pub fn prev(&self) -> Option<Weak<Self>> {
        self.links.lock().prev.clone()
    }

    pub fn set_links(&self, prev: Option<Weak<Self>>, next: Option<Arc<Self>>) {
        let mut links = self.links.lock();
        links.prev = prev;
        links.next = next;
    }

    pub fn set_prev(&self, prev: Option<Weak<Self>>) {
        self.links.lock().prev = prev;
    }

    pub fn set_next(&self, next: Option<Arc<Self>>) {
        self.links.lock().next = next;
    }

    /// Tombstone this node in place: drop the prev link, re-point next at
    /// `end`. Caller holds the signal lock.
    pub fn tombstone(&self, end: Arc<Self>) -> Option<Arc<Self>> {
        let mut links = self.links.lock();
        links.prev = None;
        links.next.replace(end)
    }

    /// Execute the slot. `None` on sentinels (which are never dispatched).
    #[inline]
    pub fn call(&self, args: &A) -> Option<R> {
        self.slot.as_ref().map(|slot| slot(args))
    }

    /// Whether emission must route this slot through the owner thread's
    /// dispatch queue. A queued slot emitted from its own thread runs
    /// directly.
    pub fn is_queued(&self) -> bool {
        match self.owner {
            Some(owner) => owner != thread::current().id(),
            None => false,
        }
    }

    #[inline]
    pub fn owner_thread(&self) -> Option<ThreadId> {
        self.owner
    }
}

impl<A: 'static, R: 'static> ConnectionNode for SlotNode<A, R> {
    fn is_connected(&self) -> bool {
        self.links.lock().prev.is_some()
    }

    fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    fn block(&self) {
        // Ordered against in-flight emissions observing the flag.
        let _guard = self.lock.lock();
        self.blocked.store(true, Ordering::SeqCst);
    }

    fn try_block(&self) -> bool {
        let _guard = self.lock.lock();
        if self.blocked.load(Ordering::SeqCst) {
            false
        } else {
            self.blocked.store(true, Ordering::SeqCst);
            true
        }
    }

    fn unblock(&self) {
        self.blocked.store(false, Ordering::SeqCst);
    }

    fn disconnect(&self) {
        let _guard = self.lock.lock();

        let mut links = self.links.lock();
        let Some(prev) = links.prev.take() else {
            return;
        };
        // Leave the next link alive so emissions that already hold this
        // node can still traverse forward.
        let next = links.next.clone();
        drop(links);

        let prev = prev.upgrade();
        if let Some(prev) = &prev {
            prev.links.lock().next = next.clone();
        }
        if let Some(next) = &next {
            next.links.lock().prev = prev.as_ref().map(Arc::downgrade);
        }
        debug!("slot disconnected");
    }
}
