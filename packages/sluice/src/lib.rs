//! # Sluice: CSP-style bounded async channels.
//!
//! A [`Channel`] is a bounded, typed conduit linking one or more producers with
//! one or more consumers. Producers and consumers suspend cooperatively (no OS
//! thread is ever blocked) when the channel cannot complete an operation
//! immediately, and resume when progress becomes possible. A [`Select`] lets a
//! task wait on several channels at once and act on whichever becomes ready
//! first, with fair random tie-breaking among cases that are ready
//! immediately.
//!
//! Unlike split sender/receiver channel designs, a `Channel<T>` is a single
//! cloneable handle in the CSP tradition: any holder may send, receive, or
//! close. Closing is an explicit, monotonic signal: after [`Channel::close`],
//! sends fail immediately while receives drain whatever is still buffered and
//! then yield [`RecvResult::Closed`].
//!
//! ```
//! use sluice::{Channel, RecvResult};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ch = Channel::new();
//!     let tx = ch.clone();
//!     tokio::spawn(async move {
//!         for i in 0..10 {
//!             tx.send(i).await.unwrap();
//!         }
//!         tx.close();
//!     });
//!     let mut got = Vec::new();
//!     while let RecvResult::Item(i) = ch.recv().await {
//!         got.push(i);
//!     }
//!     assert_eq!(got, (0..10).collect::<Vec<i32>>());
//! }
//! ```
//!
//! Timeouts are not built into send or receive; they are composed from a
//! timer channel and a select:
//!
//! ```no_run
//! use std::time::Duration;
//! use sluice::{after, Channel, Select};
//!
//! # async fn demo(work: Channel<String>) {
//! let timeout = after(Duration::from_millis(250));
//! let mut sel = Select::new();
//! sel.case(&work, |r| async move {
//!     if let sluice::RecvResult::Item(job) = r {
//!         println!("got {job}");
//!     }
//! });
//! sel.case(&timeout, |_| async move { println!("timed out") });
//! sel.end().await;
//! # }
//! ```
//!
//! This crate assumes a running [tokio] runtime: parked operations are
//! resolved through oneshot completion handles, and the timer channels and
//! stream helpers drive themselves with detached tasks.

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod channel;
mod select;
mod stream;
mod time;

pub use crate::channel::api::{Channel, RecvResult};
pub use crate::select::Select;
pub use crate::stream::{merge, merge_many};
pub use crate::time::{after, tick};

/// Error types
pub mod error {
    pub use crate::channel::error::*;
}

pub use crate::error::{CapacityError, ClosedError, TrySendError};
