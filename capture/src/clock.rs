//! Extension of the 16-bit hardware counter to a 32-bit tick count.
//!
//! The upper half comes from a software count of counter wraps, bumped by the
//! overflow interrupt. A capture that lands right after a wrap can be serviced
//! before the overflow interrupt had a chance to run. The overflow flag is then
//! still pending, and the latched value tells which side of the wrap the edge
//! was on: a small value was latched after the wrap, a large one before it.
//! This only holds while the overflow interrupt is never delayed by more than
//! half a counter period.

/// First counter value of the upper half of the counter range.
pub const HALF_RANGE: u16 = 0x8000;

/// Wrap count to use for a capture latched at `latched`.
///
/// `pending` is the hardware overflow flag as seen by the capture handler,
/// `stored` the wrap count maintained by the overflow handler.
#[inline]
pub fn adjusted_overflow(pending: bool, latched: u16, stored: u16) -> u16 {
    if pending && latched < HALF_RANGE {
        stored.wrapping_add(1)
    } else {
        stored
    }
}

#[inline]
pub fn extend(high: u16, low: u16) -> u32 {
    (u32::from(high) << 16) | u32::from(low)
}

/// Wrap counter owned by the capture interrupt context.
pub struct TickClock {
    overflow_high: u16,
}

impl TickClock {
    pub const fn new() -> Self {
        TickClock { overflow_high: 0 }
    }

    pub fn reset(&mut self) {
        self.overflow_high = 0;
    }

    /// The hardware counter wrapped from its maximum to zero.
    #[inline]
    pub fn on_overflow(&mut self) {
        self.overflow_high = self.overflow_high.wrapping_add(1);
    }

    /// Absolute ticks for a capture. Does not consume the pending overflow;
    /// that stays with [`TickClock::on_overflow`].
    #[inline]
    pub fn on_capture(&self, latched: u16, overflow_pending: bool) -> u32 {
        extend(
            adjusted_overflow(overflow_pending, latched, self.overflow_high),
            latched,
        )
    }

    #[cfg(test)]
    fn overflows(&self) -> u16 {
        self.overflow_high
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{adjusted_overflow, extend, TickClock, HALF_RANGE};

    #[test]
    fn pending_overflow_with_low_capture_counts_the_wrap() {
        let stored = 7;
        let latched = HALF_RANGE - 1;
        assert_eq!(adjusted_overflow(true, latched, stored), 8);

        let mut clock = TickClock::new();
        for _ in 0..stored {
            clock.on_overflow();
        }
        assert_eq!(
            clock.on_capture(latched, true),
            ((u32::from(stored) + 1) << 16) | u32::from(latched)
        );
        assert_eq!(clock.overflows(), stored);
    }

    #[test]
    fn pending_overflow_with_high_capture_is_before_the_wrap() {
        let stored = 7;
        for &latched in &[HALF_RANGE, 0xFFFE, 0xFFFF] {
            assert_eq!(adjusted_overflow(true, latched, stored), stored);
            let mut clock = TickClock::new();
            for _ in 0..stored {
                clock.on_overflow();
            }
            assert_eq!(
                clock.on_capture(latched, true),
                (u32::from(stored) << 16) | u32::from(latched)
            );
        }
    }

    #[test]
    fn no_pending_overflow_uses_stored_count() {
        for &latched in &[0u16, 1, HALF_RANGE - 1, HALF_RANGE, 0xFFFF] {
            assert_eq!(adjusted_overflow(false, latched, 3), 3);
        }
    }

    #[test]
    fn extend_places_wraps_in_upper_half() {
        assert_eq!(extend(0, 0x1234), 0x1234);
        assert_eq!(extend(1, 0), 0x1_0000);
        assert_eq!(extend(0xFFFF, 0xFFFF), u32::MAX);
    }

    #[test]
    fn wrap_count_rolls_over() {
        let mut clock = TickClock::new();
        for _ in 0..=u32::from(u16::MAX) {
            clock.on_overflow();
        }
        assert_eq!(clock.overflows(), 0);
        assert_eq!(adjusted_overflow(true, 5, u16::MAX), 0);
    }

    #[test]
    fn reset_zeroes_wrap_count() {
        let mut clock = TickClock::new();
        clock.on_overflow();
        clock.on_overflow();
        clock.reset();
        assert_eq!(clock.on_capture(10, false), 10);
    }
}
