#![no_std]

pub mod tim3;
pub mod transport;

use cortex_m::peripheral::DWT;

use defmt_rtt as _; // global logger
use panic_probe as _;
use stm32f4xx_hal as _; // memory layout

#[defmt::timestamp]
fn timestamp() -> u64 {
    // NOTE reads 0 until `init` enables the cycle counter
    DWT::get_cycle_count() as u64
}
