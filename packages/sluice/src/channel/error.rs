// channel error types.

use std::fmt;
use thiserror::Error;


/// Error for trying to send into a channel which has been closed
///
/// Returned synchronously by a send that finds the channel already closed, and asynchronously (as
/// the resolution of a parked send) when [`close`](crate::Channel::close) drains a waiting sender.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("channel closed")]
pub struct ClosedError;

/// Error for trying to create a channel with a capacity of zero
///
/// Channels must be able to buffer at least one element; rendezvous channels are not supported.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("channel capacity must be at least 1")]
pub struct CapacityError;

/// Error for trying to send without suspending
///
/// Both variants hand the element back, since nothing was consumed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TrySendError<T> {
    /// The buffer is full and no receiver is parked
    Full(T),
    /// The channel has been closed
    Closed(T),
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrySendError::Full(_) => write!(f, "channel full"),
            TrySendError::Closed(_) => write!(f, "channel closed"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for TrySendError<T> {}

impl<T> TrySendError<T> {
    /// Recover the element that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(t) => t,
            TrySendError::Closed(t) => t,
        }
    }

    /// Whether this is the `Full` variant.
    pub fn is_full(&self) -> bool {
        matches!(self, TrySendError::Full(_))
    }
}
