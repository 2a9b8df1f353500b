//! Animation trait, frame timing and the helpers shared by the built-in effects.
//!
//! An animation is a stateful generator. Each call to [`Animation::advance`]
//! writes the next frame through the [`StripState`] and reports how long that
//! frame should be held. The engine owns the flush, the sleep and the
//! cancellation check; animations never talk to the driver directly.

use core::num::NonZeroU32;
use core::time::Duration;

use heapless::Vec;
use rand::Rng;

use crate::color::Color;
use crate::colors::{BLUE, GREEN, OFF, RED};
use crate::effects::{
    Breathing, Firework, Flashing, GradientShift, LoadingSweep, MovingBlocks, MovingColors,
    Pomodoro, RotatingBands, Sparkle,
};
use crate::strip::{LedDriver, StripState};
use crate::types::{StripError, ValidationError};

/// Maximum number of colors an animation palette can hold.
pub const MAX_COLORS: usize = 16;

/// Ordered colors handed to an animation.
pub type ColorList = Vec<Color, MAX_COLORS>;

/// Outcome of rendering one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Keep the frame on the strip for this long, then advance again.
    Hold(Duration),

    /// Bounded animation reached its end. Nothing new was drawn.
    Finished,
}

/// A procedural animation for a strip of up to `CAP` LEDs.
pub trait Animation<const CAP: usize> {
    /// Validates the animation against the strip before the first frame.
    fn check(&self, _num_leds: usize) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Writes the next frame into `strip`. The caller flushes.
    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>>;
}

/// Returns the default red/green/blue palette.
pub fn rgb_list() -> ColorList {
    let mut colors = ColorList::new();
    for color in [RED, GREEN, BLUE] {
        // MAX_COLORS >= 3
        let _ = colors.push(color);
    }
    colors
}

/// Builds a palette from a slice.
///
/// # Errors
/// * `EmptyPalette` - `colors` is empty
/// * `CapacityExceeded` - more than [`MAX_COLORS`] colors
pub fn color_list(colors: &[Color]) -> Result<ColorList, ValidationError> {
    if colors.is_empty() {
        return Err(ValidationError::EmptyPalette);
    }
    ColorList::from_slice(colors).map_err(|_| ValidationError::CapacityExceeded {
        requested: colors.len(),
        capacity: MAX_COLORS,
    })
}

/// Brightness ramp `1/steps ..= steps/steps` followed by the way back down.
///
/// With `repeat_peak` the full level and the lowest level each appear twice
/// per cycle (`1 .. n, n .. 1`). Without it the descent starts below the peak
/// (`1 .. n, n-1 .. 1`), so the peak is never doubled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    steps: NonZeroU32,
    repeat_peak: bool,
}

impl Envelope {
    pub const fn new(steps: NonZeroU32, repeat_peak: bool) -> Self {
        Self { steps, repeat_peak }
    }

    /// Number of levels in one cycle.
    pub fn len(&self) -> usize {
        let steps = self.steps.get() as usize;
        if self.repeat_peak {
            2 * steps
        } else {
            2 * steps - 1
        }
    }

    /// Always false; an envelope has at least one level.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Level at `position` (taken modulo [`Envelope::len`]) as the exact
    /// fraction `(numerator, steps)`.
    pub fn fraction(&self, position: usize) -> (u32, u32) {
        let steps = self.steps.get();
        let n = steps as usize;
        let position = position % self.len();
        let numerator = if position < n {
            position + 1
        } else if self.repeat_peak {
            2 * n - position
        } else {
            2 * n - 1 - position
        };
        (numerator as u32, steps)
    }

    /// Level at `position` in `0.0..=1.0`.
    pub fn level(&self, position: usize) -> f64 {
        let (numerator, steps) = self.fraction(position);
        f64::from(numerator) / f64::from(steps)
    }
}

/// Converts a user supplied step count.
///
/// # Errors
/// * `ZeroSteps` - `steps` is zero
pub fn envelope_steps(steps: u32) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(steps).ok_or(ValidationError::ZeroSteps)
}

/// Step count for constants; zero becomes one.
pub(crate) const fn const_steps(steps: u32) -> NonZeroU32 {
    match NonZeroU32::new(steps) {
        Some(steps) => steps,
        None => NonZeroU32::MIN,
    }
}

/// Source index for LED `index` after rotating right `shift` times.
///
/// Rotating right moves the last element to the front.
#[inline]
pub fn rotated_right(index: usize, shift: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index + len - shift % len) % len
}

/// Source index for LED `index` after rotating left `shift` times.
#[inline]
pub fn rotated_left(index: usize, shift: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index + shift % len) % len
}

/// Color of LED `index` when `num_leds` LEDs are split into one contiguous
/// block per palette color.
///
/// Blocks are `num_leds / colors.len()` long; the first `num_leds % colors.len()`
/// colors each take one extra LED. An empty palette gives OFF.
pub(crate) fn block_color(index: usize, num_leds: usize, colors: &[Color]) -> Color {
    let count = colors.len();
    if count == 0 {
        return OFF;
    }
    let base = num_leds / count;
    let remainder = num_leds % count;
    let long_span = remainder * (base + 1);

    let block = if index < long_span {
        index / (base + 1)
    } else {
        // base > 0 here: when base == 0, long_span == num_leds > index
        remainder + (index - long_span) / base
    };
    colors[block.min(count - 1)]
}

/// The built-in animations by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum AnimationKind {
    RotatingBands,
    Loading,
    Flashing,
    Breathing,
    Sparkle,
    Gradient,
    MovingColors,
    MovingBlocks,
    Firework,
    Pomodoro,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 10] = [
        AnimationKind::RotatingBands,
        AnimationKind::Loading,
        AnimationKind::Flashing,
        AnimationKind::Breathing,
        AnimationKind::Sparkle,
        AnimationKind::Gradient,
        AnimationKind::MovingColors,
        AnimationKind::MovingBlocks,
        AnimationKind::Firework,
        AnimationKind::Pomodoro,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnimationKind::RotatingBands => "rotating-bands",
            AnimationKind::Loading => "loading",
            AnimationKind::Flashing => "flashing",
            AnimationKind::Breathing => "breathing",
            AnimationKind::Sparkle => "sparkle",
            AnimationKind::Gradient => "gradient",
            AnimationKind::MovingColors => "moving-colors",
            AnimationKind::MovingBlocks => "moving-blocks",
            AnimationKind::Firework => "firework",
            AnimationKind::Pomodoro => "pomodoro",
        }
    }

    /// Finds a kind by its [`name`](AnimationKind::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Builds this animation with its default parameters for a strip of
    /// `num_leds` LEDs. The sparkle count is capped at `num_leds`.
    pub fn default_animation<const CAP: usize>(&self, num_leds: usize) -> BuiltinAnimation<CAP> {
        match self {
            AnimationKind::RotatingBands => RotatingBands::default().into(),
            AnimationKind::Loading => LoadingSweep::default().into(),
            AnimationKind::Flashing => Flashing::default().into(),
            AnimationKind::Breathing => Breathing::default().into(),
            AnimationKind::Sparkle => {
                let mut sparkle = Sparkle::default();
                sparkle.sparkle_count = sparkle.sparkle_count.min(num_leds);
                sparkle.into()
            }
            AnimationKind::Gradient => GradientShift::default().into(),
            AnimationKind::MovingColors => MovingColors::default().into(),
            AnimationKind::MovingBlocks => MovingBlocks::default().into(),
            AnimationKind::Firework => Firework::default().into(),
            AnimationKind::Pomodoro => Pomodoro::default().into(),
        }
    }
}

impl core::fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Any of the built-in animations, ready to hand to the engine.
#[derive(Debug, Clone)]
pub enum BuiltinAnimation<const CAP: usize> {
    RotatingBands(RotatingBands),
    Loading(LoadingSweep),
    Flashing(Flashing),
    Breathing(Breathing),
    Sparkle(Sparkle<CAP>),
    Gradient(GradientShift),
    MovingColors(MovingColors),
    MovingBlocks(MovingBlocks),
    Firework(Firework),
    Pomodoro(Pomodoro),
}

impl<const CAP: usize> BuiltinAnimation<CAP> {
    pub fn kind(&self) -> AnimationKind {
        match self {
            BuiltinAnimation::RotatingBands(_) => AnimationKind::RotatingBands,
            BuiltinAnimation::Loading(_) => AnimationKind::Loading,
            BuiltinAnimation::Flashing(_) => AnimationKind::Flashing,
            BuiltinAnimation::Breathing(_) => AnimationKind::Breathing,
            BuiltinAnimation::Sparkle(_) => AnimationKind::Sparkle,
            BuiltinAnimation::Gradient(_) => AnimationKind::Gradient,
            BuiltinAnimation::MovingColors(_) => AnimationKind::MovingColors,
            BuiltinAnimation::MovingBlocks(_) => AnimationKind::MovingBlocks,
            BuiltinAnimation::Firework(_) => AnimationKind::Firework,
            BuiltinAnimation::Pomodoro(_) => AnimationKind::Pomodoro,
        }
    }

    /// Replaces the per-tick delay. Pomodoro keeps its pace and only
    /// changes its completion flashing.
    pub fn set_delay(&mut self, delay: Duration) {
        match self {
            BuiltinAnimation::RotatingBands(a) => a.delay = delay,
            BuiltinAnimation::Loading(a) => a.delay = delay,
            BuiltinAnimation::Flashing(a) => a.delay = delay,
            BuiltinAnimation::Breathing(a) => a.delay = delay,
            BuiltinAnimation::Sparkle(a) => a.delay = delay,
            BuiltinAnimation::Gradient(a) => a.delay = delay,
            BuiltinAnimation::MovingColors(a) => a.delay = delay,
            BuiltinAnimation::MovingBlocks(a) => a.delay = delay,
            BuiltinAnimation::Firework(a) => a.delay = delay,
            BuiltinAnimation::Pomodoro(a) => a.finale.delay = delay,
        }
    }
}

macro_rules! builtin_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl<const CAP: usize> From<$ty> for BuiltinAnimation<CAP> {
                fn from(animation: $ty) -> Self {
                    BuiltinAnimation::$variant(animation)
                }
            }
        )*
    };
}

builtin_from! {
    RotatingBands => RotatingBands,
    Loading => LoadingSweep,
    Flashing => Flashing,
    Breathing => Breathing,
    Sparkle => Sparkle<CAP>,
    Gradient => GradientShift,
    MovingColors => MovingColors,
    MovingBlocks => MovingBlocks,
    Firework => Firework,
    Pomodoro => Pomodoro,
}

impl<const CAP: usize> Animation<CAP> for BuiltinAnimation<CAP> {
    fn check(&self, num_leds: usize) -> Result<(), ValidationError> {
        match self {
            BuiltinAnimation::RotatingBands(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::Loading(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::Flashing(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::Breathing(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::Sparkle(a) => a.check(num_leds),
            BuiltinAnimation::Gradient(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::MovingColors(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::MovingBlocks(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::Firework(a) => Animation::<CAP>::check(a, num_leds),
            BuiltinAnimation::Pomodoro(a) => Animation::<CAP>::check(a, num_leds),
        }
    }

    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        match self {
            BuiltinAnimation::RotatingBands(a) => a.advance(strip, rng),
            BuiltinAnimation::Loading(a) => a.advance(strip, rng),
            BuiltinAnimation::Flashing(a) => a.advance(strip, rng),
            BuiltinAnimation::Breathing(a) => a.advance(strip, rng),
            BuiltinAnimation::Sparkle(a) => a.advance(strip, rng),
            BuiltinAnimation::Gradient(a) => a.advance(strip, rng),
            BuiltinAnimation::MovingColors(a) => a.advance(strip, rng),
            BuiltinAnimation::MovingBlocks(a) => a.advance(strip, rng),
            BuiltinAnimation::Firework(a) => a.advance(strip, rng),
            BuiltinAnimation::Pomodoro(a) => a.advance(strip, rng),
        }
    }
}
