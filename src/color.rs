//! 8-bit RGB color value used for every LED in the strip.

use core::fmt::Write;
use core::str::FromStr;

use heapless::String;
use palette::{Mix, Srgb};

use crate::types::ValidationError;

/// Color of a single LED.
///
/// Components are `u8`, so a constructed `Color` is always in range. Use
/// [`Color::from_components`] for integers that come from outside the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Creates a color from 8-bit components.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Creates a color from unchecked integer components.
    ///
    /// # Errors
    /// * `ComponentOutOfRange` - any component is outside `0..=255`
    pub fn from_components(red: i32, green: i32, blue: i32) -> Result<Self, ValidationError> {
        let channel = |value: i32| {
            u8::try_from(value).map_err(|_| ValidationError::ComponentOutOfRange(value))
        };
        Ok(Self::new(channel(red)?, channel(green)?, channel(blue)?))
    }

    /// Parses `rrggbb` or `#rrggbb`.
    ///
    /// # Errors
    /// * `InvalidHexLength` - not exactly six digits after the optional `#`
    /// * `InvalidHexDigit` - a character outside `0-9a-fA-F`
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ValidationError::InvalidHexLength(digits.len()));
        }
        // from_str_radix alone would accept a leading '+'
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidHexDigit);
        }

        let channel = |range: core::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ValidationError::InvalidHexDigit)
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Formats as `#rrggbb` with lowercase digits.
    pub fn to_hex(&self) -> String<7> {
        let mut hex = String::new();
        // Seven bytes always fit "#rrggbb".
        let _ = write!(hex, "{}", self);
        hex
    }

    /// Scales every component by `factor`, truncating toward zero.
    ///
    /// # Errors
    /// * `FactorOutOfRange` - `factor` is outside `0.0..=1.0` (or NaN)
    pub fn dim(&self, factor: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(ValidationError::FactorOutOfRange(factor));
        }
        Ok(self.scaled(factor))
    }

    /// Dims by a factor already known to be in `0.0..=1.0`.
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let channel = |value: u8| (f64::from(value) * factor) as u8;
        Self::new(channel(self.red), channel(self.green), channel(self.blue))
    }

    /// Dims by the exact fraction `num / den`, which must not exceed one.
    pub(crate) fn scaled_ratio(&self, num: u32, den: u32) -> Self {
        let den = den.max(1);
        let num = num.min(den);
        let channel = |value: u8| (u32::from(value) * num / den) as u8;
        Self::new(channel(self.red), channel(self.green), channel(self.blue))
    }

    /// Linear blend `start + (end - start) * factor`, truncated toward zero.
    ///
    /// `factor` is expected in `0.0..=1.0`. Values outside are clamped by the
    /// blend, so the result always stays between `start` and `end`.
    pub fn interpolate(start: Color, end: Color, factor: f64) -> Color {
        let wide = |c: Color| {
            Srgb::<f64>::new(f64::from(c.red), f64::from(c.green), f64::from(c.blue))
        };
        let mixed = wide(start).mix(wide(end), factor);
        Color::new(mixed.red as u8, mixed.green as u8, mixed.blue as u8)
    }

    /// [`Color::interpolate`] at the exact fraction `num / den` (`num <= den`).
    pub(crate) fn interpolate_ratio(start: Color, end: Color, num: u32, den: u32) -> Color {
        let den = i64::from(den.max(1));
        let num = i64::from(num).min(den);
        // start * den + (end - start) * num stays non-negative, so division truncates
        let channel = |a: u8, b: u8| {
            let (a, b) = (i64::from(a), i64::from(b));
            ((a * den + (b - a) * num) / den) as u8
        };
        Color::new(
            channel(start.red, end.red),
            channel(start.green, end.green),
            channel(start.blue, end.blue),
        )
    }

    /// Returns true if all components are zero.
    #[inline]
    pub const fn is_off(&self) -> bool {
        self.red == 0 && self.green == 0 && self.blue == 0
    }
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl From<Srgb<u8>> for Color {
    fn from(rgb: Srgb<u8>) -> Self {
        Color::new(rgb.red, rgb.green, rgb.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(color: Color) -> Self {
        Srgb::new(color.red, color.green, color.blue)
    }
}
