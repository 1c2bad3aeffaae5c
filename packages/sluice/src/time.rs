//! Timer channels.
//!
//! Timeouts are composed rather than built into send and receive: include a timer channel as
//! one case of a [`Select`](crate::Select), and if it wins, the deadline has elapsed.

use crate::channel::api::Channel;
use std::time::{Duration, Instant};


/// Create a channel that emits the current instant once after `duration`, then closes
///
/// The channel is driven by a detached task; dropping the returned handle without receiving is
/// fine. Must be called within a tokio runtime.
pub fn after(duration: Duration) -> Channel<Instant> {
    let channel = Channel::new();
    let driver = channel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        // the consumer may have closed the channel already; close is idempotent either way
        let _ = driver.send(Instant::now()).await;
        driver.close();
    });
    channel
}

/// Create a channel that emits the current instant every `period`
///
/// The driving task parks on the channel between ticks, so a slow consumer delays subsequent
/// ticks rather than piling them up. The channel never closes on its own; closing it from the
/// consumer side stops the driver. Must be called within a tokio runtime.
pub fn tick(period: Duration) -> Channel<Instant> {
    let channel = Channel::new();
    let driver = channel.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            if driver.send(Instant::now()).await.is_err() {
                trace!("tick channel closed, stopping driver");
                break;
            }
        }
    });
    channel
}
