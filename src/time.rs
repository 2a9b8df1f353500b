//! Sleeping between frames.
//!
//! The engine sleeps through [`embedded_hal::delay::DelayNs`], so any HAL delay
//! (or [`StdDelay`] on a host) can drive it.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocks for `hold`, split into `u32` microsecond chunks.
///
/// Sub-microsecond remainders are dropped.
pub fn sleep_for<T: DelayNs + ?Sized>(delay: &mut T, hold: Duration) {
    let mut micros = hold.as_micros();
    while micros > 0 {
        let chunk = micros.min(u128::from(u32::MAX)) as u32;
        delay.delay_us(chunk);
        micros -= u128::from(chunk);
    }
}

/// Delay backed by `std::thread::sleep`.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
