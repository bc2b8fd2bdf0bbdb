//! Producer side: turns capture-channel interrupts into queued events.
//!
//! Everything here runs in interrupt context. Each entry point does a fixed
//! amount of register access and queue work; nothing waits, retries or
//! allocates.

use crate::clock::TickClock;
use crate::config::CaptureConfig;
use crate::event::{CaptureEvent, Edge};
use crate::queue::{Enqueue, EventQueue};

/// Edges lost to an over-capture: the overwritten one and the opposite edge
/// before it, which the channel was not armed for. More may have gone by,
/// the hardware cannot tell.
const OVERCAPTURE_LOST: u16 = 2;

/// A free-running 16-bit counter with one input capture channel.
pub trait CaptureTimer {
    /// Stop counting and mask both interrupt sources.
    fn stop(&mut self);

    /// Count from zero at the full input clock, wrapping at `u16::MAX`.
    fn reset_counter(&mut self);

    /// Clear pending capture and overflow flags.
    fn clear_flags(&mut self);

    /// Configure the capture channel for `edge`.
    fn arm(&mut self, edge: Edge, noise_filter: bool);

    /// Unmask the capture and overflow interrupts.
    fn listen(&mut self);

    fn start(&mut self);

    /// Edge the channel is currently armed for.
    fn armed_edge(&self) -> Edge;

    /// Counter value latched by the last capture.
    fn latched(&self) -> u16;

    fn capture_pending(&self) -> bool;

    /// Another capture hit the channel while the previous one was pending
    /// and overwrote the latched value.
    fn overcaptured(&self) -> bool;

    fn overflow_pending(&self) -> bool;

    fn clear_capture(&mut self);

    fn clear_overflow(&mut self);

    /// Re-arm the channel for the opposite edge.
    fn toggle_edge(&mut self);
}

pub struct CaptureSource<T> {
    timer: T,
    clock: TickClock,
    config: CaptureConfig,
}

impl<T: CaptureTimer> CaptureSource<T> {
    pub fn new(timer: T, config: CaptureConfig) -> Self {
        CaptureSource {
            timer,
            clock: TickClock::new(),
            config,
        }
    }

    /// One-time bring-up. Must run with interrupts disabled.
    pub fn initialize<const N: usize>(&mut self, queue: &mut EventQueue<N>) {
        self.timer.stop();
        self.timer.clear_flags();

        queue.reset();
        self.clock.reset();

        self.timer.reset_counter();
        self.timer
            .arm(self.config.initial_edge, self.config.noise_filter);
        self.timer.clear_flags();
        self.timer.listen();
        self.timer.start();
    }

    /// Counter wrapped.
    #[inline]
    pub fn on_overflow(&mut self) {
        self.clock.on_overflow();
        self.timer.clear_overflow();
    }

    /// An edge was latched. The event is queued or counted as dropped, and the
    /// channel is re-armed for the opposite edge in both cases.
    #[inline]
    pub fn on_capture<const N: usize>(&mut self, queue: &mut EventQueue<N>) -> Enqueue {
        // the armed edge is the one that just fired; read it before re-arming
        let edge = self.timer.armed_edge();
        let latched = self.timer.latched();
        let overflow_pending = self.timer.overflow_pending();
        let ticks = self.clock.on_capture(latched, overflow_pending);

        if self.timer.overcaptured() {
            queue.count_lost(OVERCAPTURE_LOST);
        }
        let outcome = queue.push(CaptureEvent::new(ticks, edge));

        self.timer.clear_capture();
        self.timer.toggle_edge();
        outcome
    }

    /// Handler for timers that raise capture and overflow on one vector.
    /// A pending capture is serviced first so it still sees the overflow flag.
    #[inline]
    pub fn service<const N: usize>(&mut self, queue: &mut EventQueue<N>) -> Option<Enqueue> {
        let outcome = if self.timer.capture_pending() {
            Some(self.on_capture(queue))
        } else {
            None
        };
        if self.timer.overflow_pending() {
            self.on_overflow();
        }
        outcome
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }
}
