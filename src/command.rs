//! Command-based control and status reporting for a strip.

use heapless::{String, Vec};

use crate::color::Color;
use crate::strip::{LedDriver, StripState};

/// Requests accepted by [`AnimationEngine::handle`](crate::AnimationEngine::handle).
#[derive(Debug, Clone)]
pub enum StripCommand<A> {
    /// Fill the strip red and flush.
    PowerOn,
    /// Fill the strip with OFF and flush.
    PowerOff,
    /// Fill the strip with one color and flush.
    SetColor(Color),
    /// Start an animation.
    Start(A),
    /// Stop the running animation and clear the strip.
    Stop,
}

/// Whether any LED is lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PowerState {
    On,
    Off,
}

/// Color shared by every LED.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UniformColor {
    pub rgb: Color,
    pub hex: String<7>,
}

/// Snapshot of a strip for the command surface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusReport<const CAP: usize> {
    pub power: PowerState,
    pub num_leds: usize,
    /// `None` when the LEDs do not all share one color.
    pub current_color: Option<UniformColor>,
    pub per_led_state: Vec<Color, CAP>,
}

impl<const CAP: usize> StatusReport<CAP> {
    pub fn from_strip<D: LedDriver>(strip: &StripState<D, CAP>) -> Self {
        let power = if strip.is_powered() {
            PowerState::On
        } else {
            PowerState::Off
        };
        Self {
            power,
            num_leds: strip.len(),
            current_color: strip.uniform_color().map(|rgb| UniformColor {
                rgb,
                hex: rgb.to_hex(),
            }),
            per_led_state: strip.snapshot(),
        }
    }
}
