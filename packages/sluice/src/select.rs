//! Multi-way wait over channels.
//!
//! A [`Select`] races receive-readiness across any number of channels and runs exactly one
//! user handler for the case that wins. Building and racing are two phases: every
//! [`case`](Select::case) registers a one-shot readiness callback on its channel, and
//! [`end`](Select::end) flips the instance into the racing phase, at which point the first
//! callback to fire claims the single-resolution winner slot. Cases whose channels were already
//! receivable at registration time instead enter a pool from which the winner is drawn
//! uniformly at random, so that simultaneously-ready cases are treated fairly.

use crate::channel::api::{Channel, RecvResult};
use rand::Rng;
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::oneshot;


type BoxFut = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

// a selection thunk performs the actual receive on the winning channel, then runs the user
// handler on the result.
type Thunk = Box<dyn FnOnce() -> BoxFut + Send + 'static>;

/// Single-use multi-way wait primitive
///
/// Waits on several channels at once and processes exactly one event: an element, or the
/// channel's closure. Exactly one handler runs, exactly once. Among cases that are observably
/// ready when [`end`](Select::end) begins, each is selected with equal probability; among cases
/// that become ready only later, the first to signal readiness wins.
///
/// Instances are single-use: `end` consumes the select, so reuse is a compile error rather than
/// a runtime one.
///
/// ```no_run
/// # async fn demo(a: sluice::Channel<u32>, b: sluice::Channel<u32>) {
/// use sluice::{RecvResult, Select};
///
/// let mut sel = Select::new();
/// sel.case(&a, |r| async move {
///     match r {
///         RecvResult::Item(n) => println!("a: {n}"),
///         RecvResult::Closed => println!("a closed"),
///     }
/// });
/// sel.case(&b, |r| async move {
///     if let RecvResult::Item(n) = r {
///         println!("b: {n}");
///     }
/// });
/// sel.end().await;
/// # }
/// ```
pub struct Select {
    shared: Arc<Shared>,
    winner: oneshot::Receiver<Thunk>,
    // token-scoped clearings for every readiness slot this instance installed
    cleanups: Vec<Box<dyn FnOnce() + Send + 'static>>,
}

struct Shared {
    inner: Mutex<Inner>,
}

struct Inner {
    phase: Phase,
    // cases that were already receivable when registered, collected while building
    immediate: Vec<Thunk>,
    // single-resolution winner slot; taken by whichever offer claims it first
    winner: Option<oneshot::Sender<Thunk>>,
}

// the phase flip and every callback offer go through the same mutex, so a callback can never
// observe the building phase yet land its thunk after end() has sampled `immediate`.
enum Phase {
    Building,
    Finalizing,
}

impl Shared {
    // entry point for channel readiness callbacks.
    fn offer(&self, thunk: Thunk) {
        let mut inner = self.inner.lock().unwrap();
        match inner.phase {
            Phase::Building => inner.immediate.push(thunk),
            Phase::Finalizing => {
                if let Some(winner) = inner.winner.take() {
                    let _ = winner.send(thunk);
                }
                // a second ready case loses the race; its thunk is dropped without receiving
            }
        }
    }
}

impl Select {
    /// Create an empty select in its building phase.
    pub fn new() -> Self {
        let (winner_tx, winner_rx) = oneshot::channel();
        Select {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    phase: Phase::Building,
                    immediate: Vec::new(),
                    winner: Some(winner_tx),
                }),
            }),
            winner: winner_rx,
            cleanups: Vec::new(),
        }
    }

    /// Add a case for receiving from `channel`
    ///
    /// If this case wins, the select performs the receive itself and then runs `handler` with
    /// the result: [`RecvResult::Item`] for an element, [`RecvResult::Closed`] if the channel
    /// closed, which is the canonical way to react to closure within a select. Handlers of
    /// losing cases never run.
    ///
    /// A winning case's receive is real: if the channel was drained again between the readiness
    /// signal and the receive (possible with competing receivers), the select simply waits for
    /// the next element or closure on that channel.
    pub fn case<T, H, F>(&mut self, channel: &Channel<T>, handler: H) -> &mut Self
    where
        T: Send + 'static,
        H: FnOnce(RecvResult<T>) -> F + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let chan = channel.clone();
        let token = channel.register_recv_ready(Box::new(move || {
            let thunk: Thunk = Box::new(move || {
                Box::pin(async move {
                    let result = chan.recv().await;
                    handler(result).await;
                }) as BoxFut
            });
            shared.offer(thunk);
        }));
        let chan = channel.clone();
        self.cleanups.push(Box::new(move || chan.clear_recv_ready(token)));
        self
    }

    /// Finalize the select, wait for a winning case, and run its handler
    ///
    /// Returns once the winning handler has completed. A select with zero cases (and no case
    /// ever becoming ready) never resolves.
    pub async fn end(self) {
        let Select { shared, winner, mut cleanups } = self;

        let ready_at_end = {
            let mut inner = shared.inner.lock().unwrap();
            inner.phase = Phase::Finalizing;
            !inner.immediate.is_empty()
        };

        if ready_at_end {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                // one tick's grace so registrations racing the phase flip can land, then a
                // uniformly random pick among the immediately-ready cases
                tokio::time::sleep(Duration::from_millis(1)).await;
                let mut inner = shared.inner.lock().unwrap();
                if let Some(winner) = inner.winner.take() {
                    let i = rand::thread_rng().gen_range(0..inner.immediate.len());
                    let _ = winner.send(inner.immediate.swap_remove(i));
                }
            });
        }

        let thunk = match winner.await {
            Ok(thunk) => thunk,
            // the winner sender lives in `shared`, which we hold; it cannot drop unresolved
            Err(_) => unreachable!("select winner slot dropped while waiting"),
        };

        // clear the readiness slots of losing cases so no stale callback outlives this
        // instance. registrations that fired, or that someone else has since replaced, are
        // left alone by the token check.
        for cleanup in cleanups.drain(..) {
            cleanup();
        }

        trace!("select case won, receiving and running handler");
        thunk().await;
    }
}

impl Default for Select {
    fn default() -> Self {
        Select::new()
    }
}
