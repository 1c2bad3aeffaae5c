// locked concurrency core for the channel. the exposed API is a convenience wrapper around this.
//
// every operation here takes the mutex, does a bounded amount of synchronous work, and releases
// it. suspension happens in the api layer by awaiting a oneshot completion handle that some later
// operation (or close) resolves. the readiness callback taken out of the one-shot slot is always
// invoked after the mutex is released, except in the register-immediate branch, which the
// callback contract accounts for.
//
// invariants, holding whenever the mutex is not held mid-mutation:
//
//   - send_waiters non-empty  =>  buffer full (close drains the queue, so never closed)
//   - recv_waiters non-empty  =>  buffer empty and not closed (modulo dead handles left behind
//     by dropped receive futures, which handoff skips without delivering anything)
//   - never both queues non-empty
//   - once closed, both queues stay empty and the buffer only drains
//   - completion handles resolve at most once (oneshot consumes the sender)

use super::{
    api::RecvResult,
    error::{ClosedError, TrySendError},
    ring::Ring,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tokio::sync::oneshot;


// one-shot receive-readiness callback. must be non-blocking and cheap, and must not re-enter the
// channel it is registered on, since the register-immediate branch runs it under the mutex.
pub(crate) type ReadyCallback = Box<dyn FnOnce() + Send + 'static>;

// handle to a channel's shared state.
pub(crate) struct Core<T>(Arc<Shared<T>>);

struct Shared<T> {
    lockable: Mutex<Lockable<T>>,
}

// channel lockable state.
struct Lockable<T> {
    // buffered elements.
    buffer: Ring<T>,
    // monotonic: once true, never false again.
    closed: bool,
    // FIFO of parked send operations, each owning its element and a completion handle.
    send_waiters: VecDeque<SendWaiter<T>>,
    // FIFO of parked receive operations, each a completion handle expecting a receive result.
    recv_waiters: VecDeque<oneshot::Sender<RecvResult<T>>>,
    // at-most-one pending "receive may succeed now" callback, tagged with its registration
    // token so that only the registrar can clear it.
    recv_ready: Option<(u64, ReadyCallback)>,
    // registration token counter.
    next_ready_token: u64,
}

// parked send operation.
struct SendWaiter<T> {
    elem: T,
    done: oneshot::Sender<Result<(), ClosedError>>,
}

// outcome of starting a send while holding the mutex.
pub(crate) enum SendStart {
    // element was handed off or buffered.
    Done,
    // channel was closed; element dropped.
    Closed,
    // element parked; await this handle outside the lock.
    Parked(oneshot::Receiver<Result<(), ClosedError>>),
}

// outcome of starting a receive while holding the mutex.
pub(crate) enum RecvStart<T> {
    Ready(RecvResult<T>),
    // parked; await this handle outside the lock.
    Parked(oneshot::Receiver<RecvResult<T>>),
}

// invoke a wake hint taken out of the readiness slot. callers must have dropped the mutex.
fn fire(callback: Option<ReadyCallback>) {
    if let Some(callback) = callback {
        callback();
    }
}

impl<T> Core<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Core(Arc::new(Shared {
            lockable: Mutex::new(Lockable {
                buffer: Ring::new(capacity),
                closed: false,
                send_waiters: VecDeque::new(),
                recv_waiters: VecDeque::new(),
                recv_ready: None,
                next_ready_token: 0,
            }),
        }))
    }

    // begin a send. the closed check happens inside the critical section, so a send can never
    // park on a channel that a concurrent close has already drained.
    pub(crate) fn start_send(&self, elem: T) -> SendStart {
        let mut elem = elem;
        let (outcome, hint) = {
            let mut lock = self.0.lockable.lock().unwrap();
            if lock.closed {
                (SendStart::Closed, None)
            } else {
                loop {
                    // direct handoff to a parked receiver has priority over buffering
                    match lock.recv_waiters.pop_front() {
                        Some(waiter) => match waiter.send(RecvResult::Item(elem)) {
                            Ok(()) => break (SendStart::Done, None),
                            // the receive future was dropped while parked; skip the dead
                            // handle and keep the element
                            Err(RecvResult::Item(back)) => elem = back,
                            Err(RecvResult::Closed) => unreachable!(),
                        },
                        None => {
                            if !lock.buffer.is_full() {
                                lock.buffer.push(elem);
                                break (SendStart::Done, lock.take_ready());
                            }
                            let (done, parked) = oneshot::channel();
                            lock.send_waiters.push_back(SendWaiter { elem, done });
                            break (SendStart::Parked(parked), None);
                        }
                    }
                }
            }
        };
        fire(hint);
        outcome
    }

    // send without suspending. both failure variants hand the element back.
    pub(crate) fn try_send(&self, elem: T) -> Result<(), TrySendError<T>> {
        let mut elem = elem;
        let (result, hint) = {
            let mut lock = self.0.lockable.lock().unwrap();
            if lock.closed {
                (Err(TrySendError::Closed(elem)), None)
            } else {
                loop {
                    match lock.recv_waiters.pop_front() {
                        Some(waiter) => match waiter.send(RecvResult::Item(elem)) {
                            Ok(()) => break (Ok(()), None),
                            Err(RecvResult::Item(back)) => elem = back,
                            Err(RecvResult::Closed) => unreachable!(),
                        },
                        None => {
                            if lock.buffer.is_full() {
                                break (Err(TrySendError::Full(elem)), None);
                            }
                            lock.buffer.push(elem);
                            break (Ok(()), lock.take_ready());
                        }
                    }
                }
            }
        };
        fire(hint);
        result
    }

    // begin a receive.
    pub(crate) fn start_recv(&self) -> RecvStart<T> {
        let (outcome, hint) = {
            let mut lock = self.0.lockable.lock().unwrap();
            if let Some((elem, hint)) = lock.pop_head() {
                (RecvStart::Ready(RecvResult::Item(elem)), hint)
            } else if lock.closed {
                (RecvStart::Ready(RecvResult::Closed), None)
            } else {
                let (resolve, parked) = oneshot::channel();
                lock.recv_waiters.push_back(resolve);
                // spurious wake hint: nothing is receivable, but a pending select re-checks by
                // actually receiving
                (RecvStart::Parked(parked), lock.take_ready())
            }
        };
        fire(hint);
        outcome
    }

    // receive without suspending. None means the operation would park.
    pub(crate) fn try_recv(&self) -> Option<RecvResult<T>> {
        let (result, hint) = {
            let mut lock = self.0.lockable.lock().unwrap();
            if let Some((elem, hint)) = lock.pop_head() {
                (Some(RecvResult::Item(elem)), hint)
            } else if lock.closed {
                (Some(RecvResult::Closed), None)
            } else {
                (None, None)
            }
        };
        fire(hint);
        result
    }

    // close the channel. idempotent; never suspends.
    pub(crate) fn close(&self) {
        let hint = {
            let mut lock = self.0.lockable.lock().unwrap();
            if lock.closed {
                None
            } else {
                lock.closed = true;
                // parked receivers observe closure in FIFO order, before close returns
                for waiter in lock.recv_waiters.drain(..) {
                    let _ = waiter.send(RecvResult::Closed);
                }
                // parked senders fail; the elements they were sending are discarded
                for waiter in lock.send_waiters.drain(..) {
                    let _ = waiter.done.send(Err(ClosedError));
                }
                lock.take_ready()
            }
        };
        fire(hint);
    }

    // install a one-shot receive-readiness callback, replacing any prior one. if the channel is
    // already receivable (element buffered or closed), the callback runs synchronously under the
    // mutex and the slot stays empty. returns the registration token either way.
    pub(crate) fn register_recv_ready(&self, callback: ReadyCallback) -> u64 {
        let mut lock = self.0.lockable.lock().unwrap();
        lock.next_ready_token += 1;
        let token = lock.next_ready_token;
        if lock.closed || !lock.buffer.is_empty() {
            callback();
        } else {
            lock.recv_ready = Some((token, callback));
        }
        token
    }

    // clear the readiness slot, but only if it still holds the given registration.
    pub(crate) fn clear_recv_ready(&self, token: u64) {
        let mut lock = self.0.lockable.lock().unwrap();
        if lock.recv_ready.as_ref().is_some_and(|&(t, _)| t == token) {
            lock.recv_ready = None;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lockable.lock().unwrap().buffer.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.0.lockable.lock().unwrap().buffer.capacity()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.0.lockable.lock().unwrap().closed
    }

    // assert the queue/buffer/close invariants on the quiescent state.
    #[cfg(test)]
    fn check_invariants(&self) {
        let lock = self.0.lockable.lock().unwrap();
        if !lock.send_waiters.is_empty() {
            assert!(lock.buffer.is_full() && !lock.closed);
        }
        if !lock.recv_waiters.is_empty() {
            assert!(lock.buffer.is_empty() && !lock.closed);
        }
        assert!(lock.send_waiters.is_empty() || lock.recv_waiters.is_empty());
        assert!(lock.buffer.len() <= lock.buffer.capacity());
        if lock.closed {
            assert!(lock.recv_waiters.is_empty() && lock.send_waiters.is_empty());
        }
    }
}

impl<T> Clone for Core<T> {
    fn clone(&self) -> Self {
        Core(Arc::clone(&self.0))
    }
}

impl<T> Lockable<T> {
    fn take_ready(&mut self) -> Option<ReadyCallback> {
        self.recv_ready.take().map(|(_, callback)| callback)
    }

    // pop the buffer head. if a sender is parked, move its element into the freed slot and
    // resolve its completion handle; otherwise the freed capacity doubles as a coalesced "send
    // may succeed now" hint through the one-shot slot.
    fn pop_head(&mut self) -> Option<(T, Option<ReadyCallback>)> {
        let elem = self.buffer.pop()?;
        let hint = match self.send_waiters.pop_front() {
            Some(waiter) => {
                // close drains the sender queue, so a parked sender implies an open channel
                debug_assert!(!self.closed);
                self.buffer.push(waiter.elem);
                let _ = waiter.done.send(Ok(()));
                None
            }
            None => self.take_ready(),
        };
        Some((elem, hint))
    }
}
