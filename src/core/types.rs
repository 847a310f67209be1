/*!
 * Core Types
 * Connection flags and shared constants
 */

use std::fmt;
use std::ops::BitOr;

/// Flags controlling how a slot is attached to a signal.
///
/// Flags combine with `|`:
/// `ConnectFlags::QUEUED | ConnectFlags::CONNECT_AS_FIRST_SLOT`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConnectFlags(u32);

impl ConnectFlags {
    /// Execute the slot on the emitting thread (the default).
    pub const DIRECT: ConnectFlags = ConnectFlags(0);

    /// Route the slot through the connecting thread's dispatch queue.
    /// Only meaningful for threaded signals.
    pub const QUEUED: ConnectFlags = ConnectFlags(1);

    /// Link the slot at the front of the list instead of appending.
    pub const CONNECT_AS_FIRST_SLOT: ConnectFlags = ConnectFlags(1 << 1);

    /// Check whether all bits of `other` are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: ConnectFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Queued dispatch requested
    #[inline]
    #[must_use]
    pub const fn is_queued(self) -> bool {
        self.contains(Self::QUEUED)
    }

    /// Front insertion requested
    #[inline]
    #[must_use]
    pub const fn is_first(self) -> bool {
        self.contains(Self::CONNECT_AS_FIRST_SLOT)
    }
}

impl BitOr for ConnectFlags {
    type Output = ConnectFlags;

    fn bitor(self, rhs: ConnectFlags) -> ConnectFlags {
        ConnectFlags(self.0 | rhs.0)
    }
}

impl fmt::Debug for ConnectFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![];
        if self.is_queued() {
            parts.push("QUEUED");
        }
        if self.is_first() {
            parts.push("CONNECT_AS_FIRST_SLOT");
        }
        if parts.is_empty() {
            parts.push("DIRECT");
        }
        write!(f, "ConnectFlags({})", parts.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_combination() {
        let flags = ConnectFlags::QUEUED | ConnectFlags::CONNECT_AS_FIRST_SLOT;
        assert!(flags.is_queued());
        assert!(flags.is_first());
        assert!(flags.contains(ConnectFlags::DIRECT));

        let direct = ConnectFlags::default();
        assert!(!direct.is_queued());
        assert!(!direct.is_first());
    }
}
