use crossbeam_queue::SegQueue;

/// Unbounded lock-free MPMC FIFO of `u64` values, based on crossbeam's `SegQueue`.
///
/// Values live in a linked list of fixed-capacity blocks. Producers claim slots in the
/// tail block by advancing an atomic index and install the next block with a
/// compare-and-swap when the current one fills. Consumers claim slots from the head
/// block the same way, and the consumer that drains the last slot of a block retires it.
/// No operation takes a lock, so a stalled thread never blocks the others.
#[derive(Default)]
pub struct SegmentQueue {
    inner: SegQueue<u64>,
}

impl SegmentQueue {
    pub fn new() -> Self {
        Self {
            inner: SegQueue::new(),
        }
    }

    /// Appends `value` at the tail. Never fails; growth is bounded only by memory.
    #[inline]
    pub fn push(&self, value: u64) {
        self.inner.push(value);
    }

    /// Removes the value at the head, or returns `None` if the queue is empty.
    #[inline]
    pub fn pop(&self) -> Option<u64> {
        self.inner.pop()
    }

    /// Number of queued values at the moment of the call.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SegmentQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentQueue")
            .field("len", &self.len())
            .finish()
    }
}
