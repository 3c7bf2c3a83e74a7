//! FIFO queue of continuations waiting for outstanding calls to resolve.

use std::collections::VecDeque;
use std::fmt;

/// Continuations queued until the pending-call count returns to zero.
///
/// The barrier only stores and releases continuations; the client decides
/// when to release them.
pub struct DrainBarrier<C> {
    waiting: VecDeque<C>,
}

impl<C> DrainBarrier<C> {
    /// Creates an empty barrier.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            waiting: VecDeque::new(),
        }
    }

    /// Queues a continuation.
    pub fn push(&mut self, continuation: C) {
        self.waiting.push_back(continuation);
    }

    /// Removes and returns every queued continuation in arrival order.
    ///
    /// Continuations queued while the returned batch runs belong to the next
    /// batch.
    #[must_use]
    pub fn take_all(&mut self) -> VecDeque<C> {
        std::mem::take(&mut self.waiting)
    }

    /// Number of queued continuations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

impl<C> Default for DrainBarrier<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for DrainBarrier<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DrainBarrier")
            .field("waiting", &self.waiting.len())
            .finish()
    }
}
