//! Error types shared by the color model, the strip buffer and the animations.

/// Rejected input. Nothing is applied when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Hex color did not have exactly six digits after the optional `#`.
    InvalidHexLength(usize),

    /// Hex color contained a character outside `0-9a-fA-F`.
    InvalidHexDigit,

    /// A color component was outside `0..=255`.
    ComponentOutOfRange(i32),

    /// A dimming factor was outside `0.0..=1.0`.
    FactorOutOfRange(f64),

    /// More LEDs requested than the strip buffer can hold.
    CapacityExceeded { requested: usize, capacity: usize },

    /// An animation was given no colors to work with.
    EmptyPalette,

    /// Brightness envelopes need at least one step.
    ZeroSteps,

    /// Sparkle asked for more distinct LEDs than the strip has.
    SparkleCountExceedsStrip { count: usize, num_leds: usize },

    /// The animation cannot run on a strip with no LEDs.
    EmptyStrip,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ValidationError::InvalidHexLength(len) => {
                write!(f, "hex color must have 6 digits, got {}", len)
            }
            ValidationError::InvalidHexDigit => {
                write!(f, "hex color contains a non-hex character")
            }
            ValidationError::ComponentOutOfRange(value) => {
                write!(f, "color component {} is outside 0..=255", value)
            }
            ValidationError::FactorOutOfRange(factor) => {
                write!(f, "factor {} must be between 0 and 1", factor)
            }
            ValidationError::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "strip of {} LEDs exceeds buffer capacity of {}",
                    requested, capacity
                )
            }
            ValidationError::EmptyPalette => {
                write!(f, "animation needs at least one color")
            }
            ValidationError::ZeroSteps => {
                write!(f, "brightness envelope needs at least one step")
            }
            ValidationError::SparkleCountExceedsStrip { count, num_leds } => {
                write!(
                    f,
                    "cannot sparkle {} LEDs on a strip of {}",
                    count, num_leds
                )
            }
            ValidationError::EmptyStrip => {
                write!(f, "animation needs at least one LED")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValidationError {}

/// Failure of a strip buffer operation.
///
/// `E` is the driver's error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripError<E> {
    /// Index outside `0..len`. The buffer is left unchanged.
    IndexOutOfRange { index: usize, len: usize },

    /// The driver rejected a write or a flush.
    ///
    /// The in-memory buffer keeps whatever was written before the failure.
    Hardware(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for StripError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StripError::IndexOutOfRange { index, len } => {
                write!(f, "LED index {} out of range for strip of {}", index, len)
            }
            StripError::Hardware(err) => write!(f, "hardware error: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for StripError<E> {}
