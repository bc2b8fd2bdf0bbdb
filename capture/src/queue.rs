//! Fixed-capacity ring buffer carrying capture events from the capture
//! interrupt to the poll loop.
//!
//! One slot is always kept free so that `head == tail` means empty and
//! `head + 1 == tail` means full, without a separate length field. A queue of
//! capacity `N` therefore holds at most `N - 1` events.
//!
//! The queue itself is plain data. Sharing it between contexts is the job of
//! the owner: the producer task runs at the highest priority that touches the
//! queue and gets exclusive access for free, the consumer goes through a
//! priority-ceiling lock (see [`crate::consumer`]).

use crate::event::{CaptureEvent, Edge};

/// Outcome of offering an event to the queue.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Enqueue {
    Stored,
    /// The queue was full; the event was counted in the drop counter.
    Dropped,
}

/// Capture events in arrival order, holding at most `N - 1` of them.
///
/// `N` must be a power of two in `2..=256`; anything else fails to build:
///
/// ```compile_fail
/// let _ = edge_capture::EventQueue::<3>::new();
/// ```
///
/// ```compile_fail
/// let _ = edge_capture::EventQueue::<512>::new();
/// ```
pub struct EventQueue<const N: usize> {
    slots: [CaptureEvent; N],
    head: u8,
    tail: u8,
    dropped: u16,
}

impl<const N: usize> EventQueue<N> {
    const CAPACITY_OK: () = assert!(
        N >= 2 && N <= 256 && N.is_power_of_two(),
        "capture buffer size must be a power of two in 2..=256"
    );

    const MASK: u8 = (N - 1) as u8;

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        EventQueue {
            slots: [CaptureEvent::new(0, Edge::Rising); N],
            head: 0,
            tail: 0,
            dropped: 0,
        }
    }

    /// Number of events the queue can hold at once.
    pub const fn usable() -> usize {
        N - 1
    }

    /// Forget every queued event and zero the drop counter.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.dropped = 0;
    }

    #[inline(always)]
    fn advance(index: u8) -> u8 {
        index.wrapping_add(1) & Self::MASK
    }

    /// Producer side. Never blocks and never overwrites a queued event.
    #[inline]
    pub fn push(&mut self, event: CaptureEvent) -> Enqueue {
        let head = self.head;
        let next = Self::advance(head);
        if next == self.tail {
            self.dropped = self.dropped.wrapping_add(1);
            return Enqueue::Dropped;
        }

        // slot first, then publish
        self.slots[usize::from(head)] = event;
        self.head = next;
        Enqueue::Stored
    }

    /// Count `lost` events that never reached the queue.
    #[inline]
    pub fn count_lost(&mut self, lost: u16) {
        self.dropped = self.dropped.wrapping_add(lost);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<CaptureEvent> {
        if self.is_empty() {
            return None;
        }
        let tail = self.tail;
        let event = self.slots[usize::from(tail)];
        self.tail = Self::advance(tail);
        Some(event)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        usize::from(self.head.wrapping_sub(self.tail) & Self::MASK)
    }

    /// Events refused because the queue was full, plus those reported through
    /// [`EventQueue::count_lost`]. Wraps at `u16::MAX`.
    #[inline]
    pub fn dropped(&self) -> u16 {
        self.dropped
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Enqueue, EventQueue};
    use crate::event::{CaptureEvent, Edge};
    use std::vec::Vec;

    fn event(ticks: u32) -> CaptureEvent {
        let edge = if ticks % 2 == 0 {
            Edge::Rising
        } else {
            Edge::Falling
        };
        CaptureEvent::new(ticks, edge)
    }

    #[test]
    fn empty_pop_returns_none() {
        let mut queue = EventQueue::<8>::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.dropped(), 0);
    }

    #[test]
    fn pops_in_push_order() {
        let mut queue = EventQueue::<16>::new();
        let pushed: Vec<_> = (0..15).map(|i| event(i * 37)).collect();
        for e in &pushed {
            assert_eq!(queue.push(*e), Enqueue::Stored);
        }
        assert_eq!(queue.len(), 15);

        let popped: Vec<_> = core::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(popped, pushed);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_drops_instead_of_overwriting() {
        let mut queue = EventQueue::<8>::new();
        for i in 0..7 {
            assert_eq!(queue.push(event(i)), Enqueue::Stored);
        }
        assert_eq!(queue.push(event(100)), Enqueue::Dropped);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.len(), EventQueue::<8>::usable());

        for i in 0..7 {
            assert_eq!(queue.pop(), Some(event(i)));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn drops_counted_exactly() {
        let mut queue = EventQueue::<32>::new();
        let count = 100u32;
        for i in 0..count {
            let _ = queue.push(event(i));
        }
        assert_eq!(u32::from(queue.dropped()), count - 31);

        for i in 0..31 {
            assert_eq!(queue.pop(), Some(event(i)));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn indices_wrap_around_the_buffer() {
        let mut queue = EventQueue::<4>::new();
        for round in 0..10u32 {
            assert_eq!(queue.push(event(round * 2)), Enqueue::Stored);
            assert_eq!(queue.push(event(round * 2 + 1)), Enqueue::Stored);
            assert_eq!(queue.pop(), Some(event(round * 2)));
            assert_eq!(queue.pop(), Some(event(round * 2 + 1)));
        }
        assert!(queue.is_empty());
        assert_eq!(queue.dropped(), 0);
    }

    #[test]
    fn largest_capacity_uses_full_index_range() {
        let mut queue = EventQueue::<256>::new();
        for i in 0..255 {
            assert_eq!(queue.push(event(i)), Enqueue::Stored);
        }
        assert_eq!(queue.push(event(255)), Enqueue::Dropped);
        assert_eq!(queue.len(), 255);
        assert_eq!(queue.pop(), Some(event(0)));
        assert_eq!(queue.push(event(256)), Enqueue::Stored);
    }

    #[test]
    fn drop_counter_wraps_silently() {
        let mut queue = EventQueue::<2>::new();
        let _ = queue.push(event(0));
        for _ in 0..u32::from(u16::MAX) + 3 {
            assert_eq!(queue.push(event(1)), Enqueue::Dropped);
        }
        assert_eq!(queue.dropped(), 2);
    }

    #[test]
    fn lost_events_share_the_drop_counter() {
        let mut queue = EventQueue::<4>::new();
        assert_eq!(queue.push(event(0)), Enqueue::Stored);
        queue.count_lost(2);
        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.len(), 1);

        queue.count_lost(u16::MAX);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.pop(), Some(event(0)));
    }

    #[test]
    fn reset_clears_events_and_drops() {
        let mut queue = EventQueue::<4>::new();
        for i in 0..6 {
            let _ = queue.push(event(i));
        }
        queue.reset();
        assert!(queue.is_empty());
        assert_eq!(queue.dropped(), 0);
        assert_eq!(queue.push(event(9)), Enqueue::Stored);
        assert_eq!(queue.pop(), Some(event(9)));
    }
}
