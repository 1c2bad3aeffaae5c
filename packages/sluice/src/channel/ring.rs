// fixed-capacity ring buffer for the channel's buffered elements.
//
// this is an externally-safe, not-itself-concurrent data structure; the channel's mutex guards
// it. the write and read counters are monotonic u64s, so len = write - read and the counters
// double as a debugging record of total traffic through the buffer.

/// Fixed-capacity FIFO ring.
pub(crate) struct Ring<T> {
    slots: Box<[Option<T>]>,
    // monotonic counters. len = write - read, always in [0, capacity].
    write: u64,
    read: u64,
}

impl<T> Ring<T> {
    // construct empty with the given capacity. capacity must be at least 1.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Ring {
            slots: (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice(),
            write: 0,
            read: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        (self.write - self.read) as usize
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.write == self.read
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    // append to the back. the caller checks fullness under the channel mutex first.
    pub(crate) fn push(&mut self, elem: T) {
        debug_assert!(!self.is_full());
        let i = (self.write % self.slots.len() as u64) as usize;
        debug_assert!(self.slots[i].is_none());
        self.slots[i] = Some(elem);
        self.write += 1;
    }

    // take from the front.
    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let i = (self.read % self.slots.len() as u64) as usize;
        self.read += 1;
        let elem = self.slots[i].take();
        debug_assert!(elem.is_some());
        elem
    }
}
