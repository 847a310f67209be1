/*!
 * Error Types
 * Emission failures and the crate-wide result alias
 */

use thiserror::Error;

/// Signal operation result
///
/// # Must Use
/// Emission can fail when slots panic and must be handled
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// One or more slots panicked while the signal was invoked. The
    /// remaining slots still ran; the collector result is discarded.
    #[error("{failed} of {total} invoked slots panicked during signal emission")]
    SlotInvocation { failed: usize, total: usize },
}
