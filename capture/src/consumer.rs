//! Poll-loop side of the event queue.
//!
//! Every call takes the lock for exactly one queue operation. The lock masks
//! the capture interrupt, so it must never be held across formatting or I/O:
//! pop the event first, then do the slow work.

use rtic_core::Mutex;

use crate::event::CaptureEvent;
use crate::queue::EventQueue;

pub struct CaptureConsumer<M> {
    queue: M,
}

impl<M, const N: usize> CaptureConsumer<M>
where
    M: Mutex<T = EventQueue<N>>,
{
    pub fn new(queue: M) -> Self {
        CaptureConsumer { queue }
    }

    /// At least one event is queued. A hint only; `pop` re-checks.
    pub fn available(&mut self) -> bool {
        self.queue.lock(|queue| !queue.is_empty())
    }

    pub fn pop(&mut self) -> Option<CaptureEvent> {
        self.queue.lock(|queue| queue.pop())
    }

    /// Drop counter snapshot. Wraps at `u16::MAX`, compare successive reads
    /// with wrapping arithmetic.
    pub fn dropped_count(&mut self) -> u16 {
        self.queue.lock(|queue| queue.dropped())
    }

    /// Throw away what is queued right now, one lock per event. Events
    /// arriving meanwhile may survive. Returns how many were discarded.
    pub fn discard(&mut self) -> usize {
        let mut discarded = 0;
        while discarded < EventQueue::<N>::usable() && self.pop().is_some() {
            discarded += 1;
        }
        discarded
    }
}
