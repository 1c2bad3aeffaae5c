// implementation of the channel.
//
// channel handles wrap around Arc<Mutex<shared state>>. the shared state contains:
//
//   - a ring::Ring<T>, an externally-safe, not-itself-concurrent fixed-capacity buffer used to
//     hold the buffered elements. its write/read counters are monotonic, so
//     len = write - read is always in [0, capacity].
//
//   - a "send waiter queue": a FIFO of parked send operations. each entry owns the element being
//     sent plus a oneshot completion handle. whichever receive operation frees up buffer space
//     moves the front entry's element into the buffer and resolves its handle. close resolves
//     every entry with a closed error instead.
//
//   - a "recv waiter queue", the same idea for parked receive operations, except entries hold
//     only a completion handle expecting a receive result; senders resolve the front entry
//     directly with the element (direct handoff, bypassing the buffer).
//
//   - the closed flag, and the one-shot receive-readiness slot used by select.
//
// the mutex is held only for bounded, non-awaiting work. anything that suspends does so by
// awaiting a oneshot handle after the lock is released.
//
// the organization of these modules is as such:
//
//      ring<----------------core: owns the locking discipline and the queue/buffer/close
//                           ^     invariants. panicky and inconvenient in places.
//                           |
//                           api: wrapper around core that adapts it into an API that is
//                                convenient and defensive. the crate re-exports this API
//                                publically.
//
// there is also the error module, which contains the relevant error types, which is also
// re-exported publically.

pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod error;

mod ring;
