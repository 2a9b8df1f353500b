#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Color`**: 8-bit RGB value with hex parsing, truncating dimming and interpolation
//! - **`colors`**: Named reference colors and the on-demand random color
//! - **`StripState`**: Fixed-length LED buffer; the only writer to the driver
//! - **`LedDriver`**: Trait to implement for your strip hardware
//! - **`Animation`**: Stateful frame generator; the built-in set lives in `effects`
//! - **`AnimationEngine`**: Runs one animation at a time with cancellation and
//!   guaranteed all-off cleanup, and dispatches one-shot `StripCommand`s
//! - **`StopSignal`**: Cancellation flag checked once per tick
//!
//! Frames are held for a duration reported by the animation. The blocking
//! `AnimationEngine::run` sleeps through any `embedded_hal::delay::DelayNs`;
//! `AnimationEngine::service` lets an event loop do its own waiting instead.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod animation;
pub mod color;
pub mod colors;
pub mod command;
pub mod effects;
pub mod engine;
pub mod strip;
pub mod time;
pub mod types;

pub use animation::{Animation, AnimationKind, BuiltinAnimation, ColorList, Envelope, Tick};
pub use color::Color;
pub use command::{PowerState, StatusReport, StripCommand, UniformColor};
pub use engine::{AnimationEngine, EngineError, EngineState, RunOutcome, ServiceTiming, StopSignal};
pub use strip::{LedDriver, StripState};
pub use types::{StripError, ValidationError};

#[cfg(feature = "std")]
pub use time::StdDelay;

/// Strip capacity used by the command-line front end.
pub const DEFAULT_CAPACITY: usize = 1024;

/// LED buffer sized for [`DEFAULT_CAPACITY`].
pub type DefaultStrip<D> = StripState<D, DEFAULT_CAPACITY>;
