/*!
 * sigcast
 * In-process signal/slot event dispatch: stable connection lists,
 * collectors over slot returns, and queued cross-thread delivery
 */

pub mod connection;
pub mod context;
pub mod core;
pub mod dispatch;
pub mod list;
pub mod signal;

// Re-export public API
pub use crate::connection::{
    Connection, ConnectionBlocker, ScopedConnection, ScopedConnectionContainer, Trackable,
};
pub use crate::context::{abort_emission, current_connection};
pub use crate::core::errors::{SignalError, SignalResult};
pub use crate::core::types::ConnectFlags;
pub use crate::dispatch::{dispatch_queued_calls, DispatchStats};
pub use crate::list::{Cursor, StableList};
pub use crate::signal::collectors::{
    Collector, DefaultCollector, First, Last, Maximum, Minimum, Range,
};
pub use crate::signal::{Local, Signal, SyncSignal, ThreadPolicy, Threaded};
