//! Fixed-length LED buffer and the hardware driver seam.
//!
//! [`StripState`] is the only writer to a [`LedDriver`]. Every mutation goes
//! through a bounds-checked setter that updates the buffer first and then
//! forwards the write to the driver.

use heapless::Vec;

use crate::color::Color;
use crate::colors::OFF;
use crate::types::{StripError, ValidationError};

/// Trait for abstracting addressable LED hardware.
///
/// Implement this for your strip driver (SPI, RMT, PIO, ...). Writes are
/// staged by `set_led` and become visible on `flush`.
pub trait LedDriver {
    /// Error reported by the hardware.
    type Error: core::fmt::Debug;

    /// Stages the color of one LED.
    fn set_led(&mut self, index: usize, red: u8, green: u8, blue: u8) -> Result<(), Self::Error>;

    /// Pushes all staged colors to the strip.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

impl<T: LedDriver + ?Sized> LedDriver for &mut T {
    type Error = T::Error;

    fn set_led(&mut self, index: usize, red: u8, green: u8, blue: u8) -> Result<(), Self::Error> {
        (**self).set_led(index, red, green, blue)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

/// Current color of every LED on one strip.
///
/// # Type Parameters
/// * `D` - Driver implementation
/// * `CAP` - Maximum number of LEDs the buffer can hold
pub struct StripState<D: LedDriver, const CAP: usize> {
    driver: D,
    leds: Vec<Color, CAP>,
}

impl<D: LedDriver, const CAP: usize> StripState<D, CAP> {
    /// Creates a strip of `num_leds` LEDs, all OFF. The driver is not touched.
    ///
    /// # Errors
    /// * `CapacityExceeded` - `num_leds` is larger than `CAP`
    pub fn new(driver: D, num_leds: usize) -> Result<Self, ValidationError> {
        let mut leds = Vec::new();
        leds.resize(num_leds, OFF)
            .map_err(|_| ValidationError::CapacityExceeded {
                requested: num_leds,
                capacity: CAP,
            })?;
        Ok(Self { driver, leds })
    }

    /// Number of LEDs, fixed at construction.
    #[inline]
    pub fn len(&self) -> usize {
        self.leds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    /// Copy of every LED color in index order.
    pub fn snapshot(&self) -> Vec<Color, CAP> {
        self.leds.clone()
    }

    /// Read-only view of the buffer.
    pub fn as_slice(&self) -> &[Color] {
        &self.leds
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.leds.get(index).copied()
    }

    /// Sets one LED and forwards the write to the driver.
    ///
    /// A driver failure is returned after the buffer has been updated; the
    /// buffer and the hardware may disagree until the next successful write.
    pub fn set_led(&mut self, index: usize, color: Color) -> Result<(), StripError<D::Error>> {
        let len = self.leds.len();
        let slot = self
            .leds
            .get_mut(index)
            .ok_or(StripError::IndexOutOfRange { index, len })?;
        *slot = color;
        self.driver
            .set_led(index, color.red, color.green, color.blue)
            .map_err(StripError::Hardware)
    }

    /// Sets every LED to `color`, stopping at the first failure.
    pub fn fill(&mut self, color: Color) -> Result<(), StripError<D::Error>> {
        for index in 0..self.leds.len() {
            self.set_led(index, color)?;
        }
        Ok(())
    }

    /// Pushes the buffer to the hardware.
    pub fn flush(&mut self) -> Result<(), StripError<D::Error>> {
        self.driver.flush().map_err(StripError::Hardware)
    }

    /// Turns every LED off and flushes.
    pub fn clear(&mut self) -> Result<(), StripError<D::Error>> {
        self.fill(OFF)?;
        self.flush()
    }

    /// Returns true if any LED is not OFF.
    pub fn is_powered(&self) -> bool {
        self.leds.iter().any(|led| !led.is_off())
    }

    /// Returns the shared color when every LED is identical.
    ///
    /// An empty strip has no uniform color.
    pub fn uniform_color(&self) -> Option<Color> {
        let (first, rest) = self.leds.split_first()?;
        rest.iter().all(|led| led == first).then_some(*first)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }
}
