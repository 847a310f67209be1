/*!
 * Threading Policies
 * Compile-time selection of locking and queued-dispatch behavior
 */

mod sealed {
    pub trait Sealed {}
}

/// Scheduling policy of a signal, chosen at compile time.
///
/// The two instantiations are [`Local`] and [`Threaded`]; the trait is
/// sealed.
pub trait ThreadPolicy: sealed::Sealed + 'static {
    /// When true the signal is meant to be shared across threads:
    /// emission holds the shared lock while walking the slot list
    /// (releasing it around each slot call) and queued connections are
    /// accepted.
    const THREAD_SAFE: bool;
}

/// Single-threaded policy (the default).
///
/// Emission takes no lock and queued connections are rejected. All
/// operations are presumed to run on one thread; violating that
/// presumption is memory-safe but forfeits every cross-thread ordering
/// guarantee. Use [`Threaded`] when the signal is shared.
pub struct Local;

/// Multi-threaded policy.
///
/// The signal owns a reference-counted mutex which its connection nodes
/// keep alive, so handle-side `disconnect` and `block` stay well-defined
/// even after the signal is dropped. Supports queued connections.
pub struct Threaded;

impl sealed::Sealed for Local {}
impl sealed::Sealed for Threaded {}

impl ThreadPolicy for Local {
    const THREAD_SAFE: bool = false;
}

impl ThreadPolicy for Threaded {
    const THREAD_SAFE: bool = true;
}
