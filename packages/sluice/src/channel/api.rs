// exposed API of channels.

use super::{
    core::{self, ReadyCallback, RecvStart, SendStart},
    error::{CapacityError, ClosedError, TrySendError},
};
use std::fmt;


/// Result of receiving from a [`Channel`]
///
/// A receive never fails; closure of the channel is part of the normal result domain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecvResult<T> {
    /// An element was received
    Item(T),
    /// The channel was closed and fully drained at the moment this receive completed
    Closed,
}

impl<T> RecvResult<T> {
    /// The received element, if any.
    pub fn into_item(self) -> Option<T> {
        match self {
            RecvResult::Item(elem) => Some(elem),
            RecvResult::Closed => None,
        }
    }

    /// Whether an element was received.
    pub fn is_item(&self) -> bool {
        matches!(self, RecvResult::Item(_))
    }

    /// Whether this observed the channel drained and closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, RecvResult::Closed)
    }
}

impl<T> From<RecvResult<T>> for Option<T> {
    fn from(result: RecvResult<T>) -> Self {
        result.into_item()
    }
}


/// A bounded, typed conduit between asynchronous tasks, with an explicit close signal
///
/// A `Channel<T>` is a single cloneable handle: every clone refers to the same channel, and any
/// holder may send, receive, or close. Elements move first-in first-out; a single producer's
/// elements are received in the order they were sent.
///
/// Operations that cannot complete immediately suspend the calling task without blocking the
/// underlying thread: a send parks when the buffer is full and no receiver is waiting, a receive
/// parks when the buffer is empty and the channel is open. Parked operations are resumed in FIFO
/// order by whichever later operation makes progress possible.
///
/// [`close`](Channel::close) is monotonic: afterwards, sends fail immediately with
/// [`ClosedError`] while receives drain whatever is still buffered and then yield
/// [`RecvResult::Closed`]. The intended lifecycle is that the channel's owner calls `close`
/// exactly once, before the last handles are dropped.
pub struct Channel<T>(core::Core<T>);

impl<T> Channel<T> {
    /// Create a channel with a buffer capacity of one.
    pub fn new() -> Self {
        Channel(core::Core::new(1))
    }

    /// Create a channel with the given buffer capacity.
    ///
    /// Fails with [`CapacityError`] if `capacity` is zero; rendezvous channels are not
    /// supported.
    pub fn with_capacity(capacity: usize) -> Result<Self, CapacityError> {
        if capacity < 1 {
            return Err(CapacityError);
        }
        Ok(Channel(core::Core::new(capacity)))
    }

    /// Send an element, suspending while the channel is full
    ///
    /// Completes immediately when a receiver is parked (the element is handed off directly,
    /// bypassing the buffer) or when the buffer has room. Otherwise the send parks until a
    /// receive frees a buffer slot, or fails with [`ClosedError`] if the channel is closed
    /// first; a close discards the elements of parked sends.
    ///
    /// A send that has parked cannot be revoked: even if this future is dropped, the element is
    /// still delivered by a later receive. Use a [`Select`](crate::Select) with a cancellation
    /// channel to compose cancellable sends.
    pub async fn send(&self, elem: T) -> Result<(), ClosedError> {
        match self.0.start_send(elem) {
            SendStart::Done => Ok(()),
            SendStart::Closed => Err(ClosedError),
            SendStart::Parked(parked) => match parked.await {
                Ok(result) => result,
                // the channel state was torn down while we were parked; report closure
                Err(_) => Err(ClosedError),
            },
        }
    }

    /// Send an element only if it can be done without suspending
    ///
    /// Both failure variants hand the element back.
    pub fn try_send(&self, elem: T) -> Result<(), TrySendError<T>> {
        self.0.try_send(elem)
    }

    /// Receive an element, suspending while the channel is empty and open
    ///
    /// Returns [`RecvResult::Closed`] once the channel is closed and its buffer is drained.
    /// Receives never fail.
    ///
    /// If this future is dropped while parked, no element is lost: a sender that finds the
    /// abandoned parking spot skips it and delivers to the next waiting receiver, or buffers.
    pub async fn recv(&self) -> RecvResult<T> {
        match self.0.start_recv() {
            RecvStart::Ready(result) => result,
            RecvStart::Parked(parked) => parked.await.unwrap_or(RecvResult::Closed),
        }
    }

    /// Receive an element only if one is already buffered, or closure is already observable
    ///
    /// Returns `None` if the operation would have to park.
    pub fn try_recv(&self) -> Option<RecvResult<T>> {
        self.0.try_recv()
    }

    /// Close the channel
    ///
    /// Idempotent, and never suspends. All parked receives are resolved with
    /// [`RecvResult::Closed`] before this returns; all parked sends fail with [`ClosedError`]
    /// and the elements they were sending are discarded. Subsequent sends fail immediately;
    /// subsequent receives drain the buffer and then yield [`RecvResult::Closed`].
    pub fn close(&self) {
        self.0.close();
    }

    /// Number of elements currently buffered. Advisory under concurrency.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer is currently empty. Advisory under concurrency.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the buffer is currently full. Advisory under concurrency.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// The fixed buffer capacity.
    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    /// Whether the channel has been closed. Advisory under concurrency.
    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    // readiness-notifier plumbing for the select primitive.
    pub(crate) fn register_recv_ready(&self, callback: ReadyCallback) -> u64 {
        self.0.register_recv_ready(callback)
    }

    pub(crate) fn clear_recv_ready(&self, token: u64) {
        self.0.clear_recv_ready(token)
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Channel(self.0.clone())
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Channel::new()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Channel")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}
