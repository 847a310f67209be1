/*!
 * Signal Module
 * Typed multicast dispatch: slot lists, emission, and queued delivery
 */

pub mod collectors;

mod policy;

pub use policy::{Local, ThreadPolicy, Threaded};

use crate::connection::node::{ConnectionNode, SharedLock, SlotNode};
use crate::connection::{Connection, Trackable};
use crate::context::{self, AbortScope, ConnectionScope};
use crate::core::errors::{SignalError, SignalResult};
use crate::core::types::ConnectFlags;
use crate::dispatch;
use collectors::{Collector, DefaultCollector};
use log::{debug, warn};
use parking_lot::Mutex;
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Convenience alias for multi-threaded signals.
pub type SyncSignal<A, R = (), C = DefaultCollector<R>> = Signal<A, R, C, Threaded>;

/// A typed multicast dispatcher.
///
/// `A` is the argument tuple passed by reference to every slot, `R` the
/// slot return type, `C` the default [`Collector`] aggregating returns,
/// and `P` the [`ThreadPolicy`].
///
/// Slots connect and disconnect freely while an emission is in flight,
/// including from inside a slot: the list keeps disconnected nodes
/// traversable (tombstones), so iteration never breaks. A slot appended
/// during an emission is still visited by it; one prepended is not.
///
/// ```ignore
/// let signal: Signal<(i32,), i32> = Signal::new();
/// signal.connect(|&(x,): &(i32,)| x + 1);
/// assert_eq!(signal.emit((41,)).unwrap(), Some(42));
/// ```
pub struct Signal<A, R = (), C = DefaultCollector<R>, P = Local>
where
    P: ThreadPolicy,
{
    head: Arc<SlotNode<A, R>>,
    tail: Arc<SlotNode<A, R>>,
    lock: SharedLock,
    _collector: PhantomData<fn() -> C>,
    _policy: PhantomData<P>,
}

enum SlotOutcome {
    Invoked,
    Skipped,
    Panicked,
}

impl<A, R, C, P: ThreadPolicy> Signal<A, R, C, P> {
    pub fn new() -> Self {
        let lock: SharedLock = Arc::new(Mutex::new(()));
        let head = SlotNode::sentinel(lock.clone());
        let tail = SlotNode::sentinel(lock.clone());
        head.set_next(Some(tail.clone()));
        tail.set_prev(Some(Arc::downgrade(&head)));
        Self {
            head,
            tail,
            lock,
            _collector: PhantomData,
            _policy: PhantomData,
        }
    }

    /// Disconnect every slot.
    ///
    /// Each node is tombstoned with its forward link re-pointed at the
    /// end sentinel, so emissions already in flight converge to the end.
    pub fn clear(&self) {
        let _guard = self.lock.lock();
        self.clear_locked();
        debug!("signal cleared");
    }

    /// Number of currently connected slots.
    pub fn len(&self) -> usize {
        let _guard = P::THREAD_SAFE.then(|| self.lock.lock());
        let mut count = 0;
        let mut current = self.head.next();
        while let Some(node) = current {
            if Arc::ptr_eq(&node, &self.tail) {
                break;
            }
            count += 1;
            current = node.next();
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        match self.head.next() {
            Some(first) => Arc::ptr_eq(&first, &self.tail),
            None => true,
        }
    }

    fn clear_locked(&self) {
        let mut current = self.head.next();
        while let Some(node) = current {
            if Arc::ptr_eq(&node, &self.tail) {
                break;
            }
            current = node.tombstone(self.tail.clone());
        }
        self.head.set_next(Some(self.tail.clone()));
        self.tail.set_prev(Some(Arc::downgrade(&self.head)));
    }

    fn link_before(&self, at: &Arc<SlotNode<A, R>>, node: &Arc<SlotNode<A, R>>) {
        let prev = at.prev();
        node.set_links(prev.clone(), Some(at.clone()));
        if let Some(prev) = prev.and_then(|weak| weak.upgrade()) {
            prev.set_next(Some(node.clone()));
        }
        at.set_prev(Some(Arc::downgrade(node)));
    }
}

impl<A: 'static, R: 'static, C, P: ThreadPolicy> Signal<A, R, C, P> {
    /// Connect a slot, appending it to the list. Returns the handle that
    /// manages the new connection's lifetime.
    pub fn connect<F>(&self, slot: F) -> Connection
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.connect_flags(slot, ConnectFlags::DIRECT)
    }

    /// Connect a slot with explicit [`ConnectFlags`].
    ///
    /// `QUEUED` records the connecting thread as the slot's owner: later
    /// emissions from other threads route the call through that thread's
    /// dispatch queue. Queued connections require the [`Threaded`]
    /// policy (debug-asserted; the flag is ignored in release builds on
    /// a [`Local`] signal).
    pub fn connect_flags<F>(&self, slot: F, flags: ConnectFlags) -> Connection
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        debug_assert!(
            P::THREAD_SAFE || !flags.is_queued(),
            "queued connections require a threaded signal"
        );
        let owner = (P::THREAD_SAFE && flags.is_queued()).then(|| thread::current().id());
        let node = SlotNode::new(Box::new(slot), owner, self.lock.clone());

        {
            let _guard = self.lock.lock();
            let at = if flags.is_first() {
                self.head.next().unwrap_or_else(|| self.tail.clone())
            } else {
                self.tail.clone()
            };
            self.link_before(&at, &node);
        }
        debug!(
            "slot connected (queued: {}, first: {})",
            owner.is_some(),
            flags.is_first()
        );
        Connection::from_node(node)
    }

    /// Connect a slot on behalf of a [`Trackable`] receiver: the handle
    /// is also registered with the receiver, which disconnects it when
    /// dropped.
    pub fn connect_tracked<T, F>(&self, target: &T, slot: F) -> Connection
    where
        T: Trackable + ?Sized,
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        let conn = self.connect(slot);
        target.add_tracked_connection(conn.clone());
        conn
    }

    /// The emission loop shared by both policies. `exec` performs the
    /// actual slot call (direct or queued) and reports its outcome.
    fn emit_with<K: Collector<R>>(
        &self,
        exec: &mut dyn FnMut(&Arc<SlotNode<A, R>>, &mut K) -> SlotOutcome,
    ) -> SignalResult<K::Output> {
        let mut collector = K::default();
        let mut failed = 0usize;
        let mut invoked = 0usize;

        {
            let _abort = AbortScope::enter();
            let mut guard = P::THREAD_SAFE.then(|| self.lock.lock());

            let mut current = self.head.next().unwrap_or_else(|| self.tail.clone());
            while !Arc::ptr_eq(&current, &self.tail) {
                if current.is_connected() && !current.is_blocked() {
                    let scope = ConnectionScope::enter(current.clone());
                    // Slots must run without the lock so they can
                    // reentrantly connect, disconnect, and emit.
                    drop(guard.take());

                    let outcome = exec(&current, &mut collector);

                    guard = P::THREAD_SAFE.then(|| self.lock.lock());
                    drop(scope);

                    invoked += 1;
                    if matches!(outcome, SlotOutcome::Panicked) {
                        failed += 1;
                    }
                    if context::emission_aborted() {
                        break;
                    }
                }
                // Valid even when the node was disconnected mid-emission:
                // tombstones keep their forward link.
                let next = current.next().unwrap_or_else(|| self.tail.clone());
                current = next;
            }
        }

        if failed > 0 {
            return Err(SignalError::SlotInvocation {
                failed,
                total: invoked,
            });
        }
        Ok(collector.finish())
    }
}

impl<A: 'static, R: 'static, C> Signal<A, R, C, Local> {
    /// Invoke every connected, unblocked slot in insertion order and
    /// return the default collector's aggregate.
    pub fn emit(&self, args: A) -> SignalResult<C::Output>
    where
        C: Collector<R>,
    {
        self.invoke::<C>(args)
    }

    /// Emit with a per-invocation collector override.
    pub fn invoke<K: Collector<R>>(&self, args: A) -> SignalResult<K::Output> {
        self.emit_with::<K>(&mut |node, collector| direct_call(node, &args, collector))
    }
}

impl<A, R, C> Signal<A, R, C, Threaded>
where
    A: Clone + Send + 'static,
    R: Send + 'static,
{
    /// Invoke every connected, unblocked slot in insertion order and
    /// return the default collector's aggregate.
    ///
    /// Slots with a queued connection owned by another thread are routed
    /// through that thread's dispatch queue; for non-unit `R` the caller
    /// waits for each queued slot to finish so the collector sees values
    /// in order, while unit-returning signals fire and forget.
    pub fn emit(&self, args: A) -> SignalResult<C::Output>
    where
        C: Collector<R>,
    {
        self.invoke::<C>(args)
    }

    /// Emit with a per-invocation collector override.
    pub fn invoke<K: Collector<R>>(&self, args: A) -> SignalResult<K::Output> {
        // Queued unit-returning slots are fire-and-forget; everything
        // else waits on the owning thread's dispatch.
        let fire_and_forget = TypeId::of::<R>() == TypeId::of::<()>();
        self.emit_with::<K>(&mut |node, collector| {
            if node.is_queued() {
                match node.owner_thread() {
                    Some(owner) => queued_call(node, owner, &args, collector, fire_and_forget),
                    None => direct_call(node, &args, collector),
                }
            } else {
                direct_call(node, &args, collector)
            }
        })
    }
}

/// Run a slot on the emitting thread, isolating panics.
fn direct_call<A, R, K: Collector<R>>(
    node: &Arc<SlotNode<A, R>>,
    args: &A,
    collector: &mut K,
) -> SlotOutcome {
    match catch_unwind(AssertUnwindSafe(|| node.call(args))) {
        Ok(Some(value)) => {
            collector.collect(value);
            SlotOutcome::Invoked
        }
        Ok(None) => SlotOutcome::Skipped,
        Err(_) => {
            warn!("slot panicked during signal emission");
            SlotOutcome::Panicked
        }
    }
}

/// Package a slot call into the owner thread's mailbox. The task
/// re-checks connectivity when it finally runs and publishes the worker
/// thread's connection scope for the duration of the call.
fn queued_call<A, R, K>(
    node: &Arc<SlotNode<A, R>>,
    owner: ThreadId,
    args: &A,
    collector: &mut K,
    fire_and_forget: bool,
) -> SlotOutcome
where
    A: Clone + Send + 'static,
    R: Send + 'static,
    K: Collector<R>,
{
    let task_node = node.clone();
    let task_args = args.clone();

    if fire_and_forget {
        dispatch::enqueue(
            owner,
            Box::new(move || {
                if !task_node.is_connected() {
                    return;
                }
                let _scope = ConnectionScope::enter(task_node.clone());
                if catch_unwind(AssertUnwindSafe(|| task_node.call(&task_args))).is_err() {
                    warn!("queued slot panicked during dispatch");
                }
            }),
        );
        return SlotOutcome::Invoked;
    }

    let (tx, rx) = crossbeam_channel::bounded::<Result<R, ()>>(1);
    dispatch::enqueue(
        owner,
        Box::new(move || {
            if !task_node.is_connected() {
                return;
            }
            let _scope = ConnectionScope::enter(task_node.clone());
            match catch_unwind(AssertUnwindSafe(|| task_node.call(&task_args))) {
                Ok(Some(value)) => {
                    let _ = tx.send(Ok(value));
                }
                Ok(None) => {}
                Err(_) => {
                    warn!("queued slot panicked during dispatch");
                    let _ = tx.send(Err(()));
                }
            }
        }),
    );

    // Closed without a value means the slot was skipped or its bucket
    // dropped; treat both as a skip rather than blocking forever.
    match rx.recv() {
        Ok(Ok(value)) => {
            collector.collect(value);
            SlotOutcome::Invoked
        }
        Ok(Err(())) => SlotOutcome::Panicked,
        Err(_) => SlotOutcome::Skipped,
    }
}

impl<A, R, C, P: ThreadPolicy> Default for Signal<A, R, C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, C, P: ThreadPolicy> Drop for Signal<A, R, C, P> {
    fn drop(&mut self) {
        // Tombstone every node so outstanding handles report
        // disconnected and in-flight emissions converge to the end.
        let _guard = self.lock.lock();
        self.clear_locked();
    }
}

impl<A, R, C, P: ThreadPolicy> fmt::Debug for Signal<A, R, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").field("slots", &self.len()).finish()
    }
}
