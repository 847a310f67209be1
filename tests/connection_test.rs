/*!
 * Connection Tests
 * Handle state machine, scoped ownership, and blocker nesting
 */

use sigcast::{Connection, ConnectionBlocker, ScopedConnection, ScopedConnectionContainer, Signal};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_empty_handle() {
    let empty = Connection::new();
    assert!(!empty.is_connected());
    assert!(!empty.is_blocked());

    // All operations are inert on an empty handle.
    empty.block();
    empty.unblock();
    let mut empty2 = Connection::default();
    empty2.disconnect();

    assert_eq!(empty, empty2);
}

#[test]
fn test_clones_share_the_node() {
    let signal: Signal<()> = Signal::new();
    let conn = signal.connect(|_: &()| {});
    let alias = conn.clone();

    assert_eq!(conn, alias);
    conn.block();
    assert!(alias.is_blocked());

    let other = signal.connect(|_: &()| {});
    assert_ne!(conn, other);
}

#[test]
fn test_handle_ordering_is_consistent() {
    let signal: Signal<()> = Signal::new();
    let a = signal.connect(|_: &()| {});
    let b = signal.connect(|_: &()| {});

    assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    assert_eq!(a.cmp(&a.clone()), std::cmp::Ordering::Equal);
}

#[test]
fn test_swap() {
    let signal: Signal<()> = Signal::new();
    let mut a = signal.connect(|_: &()| {});
    let mut b = Connection::new();

    a.swap(&mut b);
    assert!(!a.is_connected());
    assert!(b.is_connected());
}

#[test]
fn test_tombstone_handle_still_answers() {
    let signal: Signal<()> = Signal::new();
    let mut conn = signal.connect(|_: &()| {});
    let alias = conn.clone();
    conn.disconnect();

    assert!(!alias.is_connected());

    // The blocked flag still toggles; it just has no observable effect.
    alias.block();
    assert!(alias.is_blocked());
    alias.unblock();
    assert!(!alias.is_blocked());
}

#[test]
fn test_scoped_connection_disconnects_on_drop() {
    let signal: Signal<()> = Signal::new();
    let conn = signal.connect(|_: &()| {});
    let alias = conn.clone();

    {
        let _scoped = ScopedConnection::from(conn);
        assert!(alias.is_connected());
    }
    assert!(!alias.is_connected());
    assert_eq!(signal.len(), 0);
}

#[test]
fn test_scoped_connection_release_escapes() {
    let signal: Signal<()> = Signal::new();
    let conn = signal.connect(|_: &()| {});
    let alias = conn.clone();

    let released = {
        let mut scoped = ScopedConnection::from(conn);
        scoped.release()
    };
    assert!(alias.is_connected());
    assert!(released.is_connected());
    assert_eq!(signal.len(), 1);
}

#[test]
fn test_container_disconnects_all_on_drop() {
    let signal: Signal<()> = Signal::new();
    let a = signal.connect(|_: &()| {});
    let b = signal.connect(|_: &()| {});

    {
        let container = ScopedConnectionContainer::new();
        container.append(a.clone());
        container.append(b.clone());
        assert_eq!(container.len(), 2);
        assert!(a.is_connected() && b.is_connected());
    }
    assert!(!a.is_connected());
    assert!(!b.is_connected());
    assert!(signal.is_empty());
}

#[test]
fn test_container_disconnect_all() {
    let signal: Signal<()> = Signal::new();
    let container = ScopedConnectionContainer::new();
    container.append(signal.connect(|_: &()| {}));
    container.append(signal.connect(|_: &()| {}));

    container.disconnect_all();
    assert!(container.is_empty());
    assert_eq!(signal.len(), 0);
}

#[test]
fn test_blocker_restores_on_drop() {
    let signal: Signal<()> = Signal::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    let conn = signal.connect(move |_: &()| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    });

    {
        let _blocker = ConnectionBlocker::new(&conn);
        assert!(conn.is_blocked());
        signal.emit(()).unwrap();
    }
    assert!(!conn.is_blocked());
    signal.emit(()).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_blocker_nesting_is_idempotent() {
    let signal: Signal<()> = Signal::new();
    let conn = signal.connect(|_: &()| {});

    let outer = ConnectionBlocker::new(&conn);
    {
        let _inner = ConnectionBlocker::new(&conn);
        assert!(conn.is_blocked());
    }
    // The inner blocker did not set the flag, so it must not clear it.
    assert!(conn.is_blocked());

    drop(outer);
    assert!(!conn.is_blocked());
}

#[test]
fn test_blocker_leaves_preblocked_connection_alone() {
    let signal: Signal<()> = Signal::new();
    let conn = signal.connect(|_: &()| {});
    conn.block();

    {
        let _blocker = ConnectionBlocker::new(&conn);
        assert!(conn.is_blocked());
    }
    // Blocked by the caller, so the guard leaves it blocked.
    assert!(conn.is_blocked());
}
