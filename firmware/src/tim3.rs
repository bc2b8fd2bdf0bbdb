//! TIM3 channel 1 input capture on PA6.
//!
//! TIM3 is a 16-bit timer on APB1. It runs without prescaler, so one tick is
//! one timer clock (84 MHz with the clock tree set up in `main`). Capture and
//! update (overflow) share the TIM3 vector; the handler goes through
//! `CaptureSource::service`, which services the capture first.

use edge_capture::{CaptureTimer, Edge};
use stm32f4xx_hal::gpio::gpioa::PA6;
use stm32f4xx_hal::gpio::{Alternate, AF2};
use stm32f4xx_hal::stm32::{RCC, TIM3};

// fSAMPLING = fCK_INT, N = 4
const IC1F_FCK_INT_N4: u8 = 0b0010;
const IC1F_NONE: u8 = 0;

pub struct Tim3Capture {
    tim: TIM3,
    _pin: PA6<Alternate<AF2>>,
}

impl Tim3Capture {
    /// Clocks and resets TIM3. Call before `RCC` is constrained.
    pub fn new(tim: TIM3, pin: PA6<Alternate<AF2>>, rcc: &RCC) -> Self {
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());
        rcc.apb1rstr.modify(|_, w| w.tim3rst().set_bit());
        rcc.apb1rstr.modify(|_, w| w.tim3rst().clear_bit());

        Tim3Capture { tim, _pin: pin }
    }
}

impl CaptureTimer for Tim3Capture {
    fn stop(&mut self) {
        self.tim.cr1.reset();
        self.tim.dier.reset();
        self.tim.ccer.reset();
    }

    fn reset_counter(&mut self) {
        // only counter overflow sets UIF, not UG
        self.tim.cr1.write(|w| w.urs().set_bit());
        self.tim.psc.reset();
        self.tim
            .arr
            .write(|w| unsafe { w.bits(u32::from(u16::MAX)) });
        self.tim.cnt.reset();
        // load PSC and ARR now instead of at the first overflow
        self.tim.egr.write(|w| w.ug().set_bit());
    }

    fn clear_flags(&mut self) {
        self.tim.sr.reset();
    }

    fn arm(&mut self, edge: Edge, noise_filter: bool) {
        let filter = if noise_filter {
            IC1F_FCK_INT_N4
        } else {
            IC1F_NONE
        };
        self.tim
            .ccmr1_input()
            .write(|w| w.cc1s().ti1().ic1f().bits(filter));
        self.tim
            .ccer
            .write(|w| w.cc1p().bit(edge == Edge::Falling).cc1e().set_bit());
    }

    fn listen(&mut self) {
        self.tim.dier.write(|w| w.uie().set_bit().cc1ie().set_bit());
    }

    fn start(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn armed_edge(&self) -> Edge {
        if self.tim.ccer.read().cc1p().bit_is_set() {
            Edge::Falling
        } else {
            Edge::Rising
        }
    }

    fn latched(&self) -> u16 {
        self.tim.ccr1.read().bits() as u16
    }

    fn capture_pending(&self) -> bool {
        self.tim.sr.read().cc1if().bit_is_set()
    }

    fn overcaptured(&self) -> bool {
        self.tim.sr.read().cc1of().bit_is_set()
    }

    fn overflow_pending(&self) -> bool {
        self.tim.sr.read().uif().bit_is_set()
    }

    // SR flags are rc_w0. Writing 1 leaves a flag alone, a read-modify-write
    // would clear flags raised between the read and the write.
    fn clear_capture(&mut self) {
        self.tim.sr.write(|w| {
            unsafe { w.bits(0xFFFF) }
                .cc1if()
                .clear_bit()
                .cc1of()
                .clear_bit()
        });
    }

    fn clear_overflow(&mut self) {
        self.tim
            .sr
            .write(|w| unsafe { w.bits(0xFFFF) }.uif().clear_bit());
    }

    fn toggle_edge(&mut self) {
        self.tim
            .ccer
            .modify(|r, w| w.cc1p().bit(!r.cc1p().bit()));
    }
}
