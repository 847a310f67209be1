/*!
 * Dispatch Queue
 * Process-wide mailbox of queued slot calls, sharded by thread identity
 */

use ahash::RandomState;
use dashmap::DashMap;
use log::trace;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::thread::{self, ThreadId};

/// A packaged slot call waiting in some thread's bucket.
pub(crate) type QueuedCall = Box<dyn FnOnce() + Send>;

/// Dispatch queue statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub total_queued: u64,
    pub total_dispatched: u64,
    pub pending_calls: usize,
}

/// Atomic dispatch statistics for lock-free updates
struct AtomicDispatchStats {
    total_queued: AtomicU64,
    total_dispatched: AtomicU64,
    pending_calls: AtomicUsize,
}

impl AtomicDispatchStats {
    const fn new() -> Self {
        Self {
            total_queued: AtomicU64::new(0),
            total_dispatched: AtomicU64::new(0),
            pending_calls: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            total_queued: self.total_queued.load(Ordering::Relaxed),
            total_dispatched: self.total_dispatched.load(Ordering::Relaxed),
            pending_calls: self.pending_calls.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide call queue: one FIFO bucket per owner thread.
struct CallQueue {
    buckets: DashMap<ThreadId, parking_lot::Mutex<VecDeque<QueuedCall>>, RandomState>,
    stats: AtomicDispatchStats,
}

static CALL_QUEUE: OnceLock<CallQueue> = OnceLock::new();

fn call_queue() -> &'static CallQueue {
    CALL_QUEUE.get_or_init(|| CallQueue {
        buckets: DashMap::with_hasher(RandomState::new()),
        stats: AtomicDispatchStats::new(),
    })
}

/// Append a packaged call to `owner`'s bucket. Delivery order within a
/// bucket is the enqueue order.
pub(crate) fn enqueue(owner: ThreadId, call: QueuedCall) {
    let queue = call_queue();
    queue
        .buckets
        .entry(owner)
        .or_default()
        .lock()
        .push_back(call);
    queue.stats.total_queued.fetch_add(1, Ordering::Relaxed);
    queue.stats.pending_calls.fetch_add(1, Ordering::Relaxed);
    trace!("queued slot call for thread {:?}", owner);
}

/// Drain and execute every call queued for the current thread, in FIFO
/// order. Returns how many calls ran.
///
/// Threads that own queued connections must call this periodically;
/// emitters of non-unit signals block until the owning thread does.
/// Calls enqueued for this thread *while* draining (e.g. by a slot that
/// emits again) land in a fresh bucket and run on the next dispatch.
pub fn dispatch_queued_calls() -> usize {
    let queue = call_queue();
    let tid = thread::current().id();

    // Detach the whole bucket first so the map shard is not held while
    // slots run (slots may enqueue new calls).
    let Some((_, calls)) = queue.buckets.remove(&tid) else {
        return 0;
    };
    let calls = calls.into_inner();

    let count = calls.len();
    queue.stats.pending_calls.fetch_sub(count, Ordering::Relaxed);
    for call in calls {
        call();
    }
    queue.stats.total_dispatched.fetch_add(count as u64, Ordering::Relaxed);
    trace!("dispatched {} queued calls on {:?}", count, tid);
    count
}

/// Snapshot of the queue counters.
///
/// Individual values are accurate but may be mutually inconsistent under
/// concurrent updates; fine for monitoring.
pub fn stats() -> DispatchStats {
    call_queue().stats.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_within_bucket() {
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let tid = thread::current().id();

        for i in 0..3 {
            let order = order.clone();
            enqueue(tid, Box::new(move || order.lock().push(i)));
        }

        assert_eq!(dispatch_queued_calls(), 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);

        // Counters are process-wide, so only lower bounds hold here.
        let stats = stats();
        assert!(stats.total_queued >= 3);
        assert!(stats.total_dispatched >= 3);
    }

    #[test]
    fn test_dispatch_only_own_bucket() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = ran.clone();

        // Queue for a thread that will never dispatch; our own drain must
        // not touch it.
        let foreign = thread::spawn(move || {
            let tid = thread::current().id();
            enqueue(tid, Box::new(move || {
                ran_clone.fetch_add(1, Ordering::SeqCst);
            }));
            tid
        })
        .join()
        .unwrap();

        assert_ne!(foreign, thread::current().id());
        dispatch_queued_calls();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_requeue_during_dispatch_runs_next_round() {
        let tid = thread::current().id();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_outer = hits.clone();
        enqueue(
            tid,
            Box::new(move || {
                hits_outer.fetch_add(1, Ordering::SeqCst);
                let hits_inner = hits_outer.clone();
                enqueue(
                    thread::current().id(),
                    Box::new(move || {
                        hits_inner.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        assert_eq!(dispatch_queued_calls(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(dispatch_queued_calls(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
