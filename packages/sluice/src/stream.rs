//! Stream helpers over channels.
//!
//! Each helper is a thin composition over [`Channel::send`] and [`Channel::recv`] and inherits
//! all channel invariants. Helpers that produce a new channel (`merge`, `merge_many`,
//! [`filter`](Channel::filter), [`map`](Channel::map)) own their output: a detached task drives
//! it and closes it when the inputs are exhausted. Draining helpers are plain async functions
//! that run in the calling task.

use crate::{
    channel::{
        api::{Channel, RecvResult},
        error::ClosedError,
    },
    select::Select,
};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering::Relaxed},
        Arc,
    },
};


impl<T> Channel<T> {
    /// Send every element of `iter` in order
    ///
    /// Stops at the first [`ClosedError`]; remaining elements are not sent. Does not close the
    /// channel afterwards; closing stays the owner's responsibility.
    pub async fn send_all<I>(&self, iter: I) -> Result<(), ClosedError>
    where
        I: IntoIterator<Item = T>,
    {
        for elem in iter {
            self.send(elem).await?;
        }
        Ok(())
    }

    /// Drain this channel into `target` until this channel closes
    ///
    /// Does not close `target`, so several sources may forward into one sink. Fails with
    /// [`ClosedError`] if `target` closes first.
    pub async fn forward(&self, target: &Channel<T>) -> Result<(), ClosedError> {
        loop {
            match self.recv().await {
                RecvResult::Item(elem) => target.send(elem).await?,
                RecvResult::Closed => return Ok(()),
            }
        }
    }

    /// Receive and discard elements until the channel closes.
    pub async fn purge(&self) {
        while let RecvResult::Item(_) = self.recv().await {}
    }

    /// Receive elements until the channel closes, returning how many there were.
    pub async fn count(&self) -> u64 {
        let mut n = 0;
        while let RecvResult::Item(_) = self.recv().await {
            n += 1;
        }
        n
    }

    /// Run `action` on every element until the channel closes.
    pub async fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(T),
    {
        while let RecvResult::Item(elem) = self.recv().await {
            action(elem);
        }
    }

    /// Run an async `action` on every element until the channel closes
    ///
    /// Elements are processed one at a time; the next receive starts only after the action's
    /// future completes.
    pub async fn for_each_async<F, Fut>(&self, mut action: F)
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = ()>,
    {
        while let RecvResult::Item(elem) = self.recv().await {
            action(elem).await;
        }
    }

    /// Broadcast every element to all of `targets`, then close them
    ///
    /// Per-element broadcast: the element is sent to every target, and all of those sends must
    /// complete before the next element is taken, so the slowest sink paces the fan-out. Targets
    /// that close early are skipped. When this channel closes, every target is closed.
    pub async fn spread(&self, targets: Vec<Channel<T>>)
    where
        T: Clone,
    {
        loop {
            match self.recv().await {
                RecvResult::Item(elem) => {
                    for target in &targets {
                        let _ = target.send(elem.clone()).await;
                    }
                }
                RecvResult::Closed => break,
            }
        }
        for target in &targets {
            target.close();
        }
    }
}

impl<T: Send + 'static> Channel<T> {
    /// Produce a channel of the elements satisfying `predicate`
    ///
    /// A detached task drains this channel through the predicate and closes the output when
    /// this channel closes. `buf` is the output buffer capacity.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is zero. Must be called within a tokio runtime.
    pub fn filter<P>(&self, mut predicate: P, buf: usize) -> Channel<T>
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        let out = Channel::with_capacity(buf).expect("filter: buf must be at least 1");
        let input = self.clone();
        let output = out.clone();
        tokio::spawn(async move {
            while let RecvResult::Item(elem) = input.recv().await {
                if predicate(&elem) && output.send(elem).await.is_err() {
                    break;
                }
            }
            output.close();
        });
        out
    }

    /// Produce a channel of the elements transformed by `f`
    ///
    /// A detached task drains this channel through `f` and closes the output when this channel
    /// closes. `buf` is the output buffer capacity.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is zero. Must be called within a tokio runtime.
    pub fn map<U, F>(&self, mut f: F, buf: usize) -> Channel<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        let out = Channel::with_capacity(buf).expect("map: buf must be at least 1");
        let input = self.clone();
        let output = out.clone();
        tokio::spawn(async move {
            while let RecvResult::Item(elem) = input.recv().await {
                if output.send(f(elem)).await.is_err() {
                    break;
                }
            }
            output.close();
        });
        out
    }
}

/// Merge two channels into one
///
/// A detached task select-loops over both inputs, forwarding whichever has an element ready,
/// and closes the output once both inputs have closed. Relative order between the two inputs is
/// unspecified; each input's own order is preserved. `buf` is the output buffer capacity.
///
/// # Panics
///
/// Panics if `buf` is zero. Must be called within a tokio runtime.
pub fn merge<T: Send + 'static>(a: &Channel<T>, b: &Channel<T>, buf: usize) -> Channel<T> {
    merge_many([a.clone(), b.clone()], buf)
}

/// Merge any number of channels into one
///
/// The n-ary form of [`merge`]: the output closes once every input has closed. An empty input
/// collection yields an immediately-closed channel.
///
/// # Panics
///
/// Panics if `buf` is zero. Must be called within a tokio runtime.
pub fn merge_many<T, I>(channels: I, buf: usize) -> Channel<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Channel<T>>,
{
    let inputs: Vec<Channel<T>> = channels.into_iter().collect();
    let out = Channel::with_capacity(buf).expect("merge: buf must be at least 1");
    let output = out.clone();
    tokio::spawn(async move {
        // each input's closed flag is owned here and set from inside the winning handler
        let done: Vec<Arc<AtomicBool>> =
            inputs.iter().map(|_| Arc::new(AtomicBool::new(false))).collect();
        loop {
            let mut sel = Select::new();
            let mut open = 0;
            for (input, flag) in inputs.iter().zip(&done) {
                if flag.load(Relaxed) {
                    continue;
                }
                open += 1;
                let output = output.clone();
                let flag = Arc::clone(flag);
                sel.case(input, move |result| async move {
                    match result {
                        RecvResult::Item(elem) => {
                            let _ = output.send(elem).await;
                        }
                        RecvResult::Closed => flag.store(true, Relaxed),
                    }
                });
            }
            if open == 0 {
                break;
            }
            sel.end().await;
        }
        trace!("merge inputs exhausted, closing output");
        output.close();
    });
    out
}
