//! Built-in animations.
//!
//! Each effect keeps its public parameters as fields and its progression as
//! private state. Patterns that scroll are not stored; the color of every LED
//! is recomputed from the pattern function and the current shift.

use core::num::NonZeroU32;
use core::time::Duration;

use heapless::Vec;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::animation::{
    Animation, ColorList, Envelope, Tick, block_color, const_steps, envelope_steps, rgb_list,
    rotated_left, rotated_right,
};
use crate::color::Color;
use crate::colors::{self, BLUE, OFF, RED, WARM_LIGHT, WHITE};
use crate::strip::{LedDriver, StripState};
use crate::types::{StripError, ValidationError};

/// LEDs per color band.
pub const BAND_WIDTH: usize = 4;

/// Repeating bands of three colors, `BAND_WIDTH` LEDs each, rotating right by
/// one LED per tick.
#[derive(Debug, Clone)]
pub struct RotatingBands {
    pub colors: [Color; 3],
    pub delay: Duration,
    shift: usize,
}

impl RotatingBands {
    pub fn new(colors: [Color; 3], delay: Duration) -> Self {
        Self {
            colors,
            delay,
            shift: 0,
        }
    }

    fn pattern(&self, index: usize) -> Color {
        let group = self.colors.len() * BAND_WIDTH;
        self.colors[(index % group) / BAND_WIDTH]
    }
}

impl Default for RotatingBands {
    fn default() -> Self {
        Self::new(
            [colors::RED, colors::GREEN, colors::BLUE],
            Duration::from_millis(100),
        )
    }
}

impl<const CAP: usize> Animation<CAP> for RotatingBands {
    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        _rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        let len = strip.len();
        for index in 0..len {
            let color = self.pattern(rotated_right(index, self.shift, len));
            strip.set_led(index, color)?;
        }
        self.shift = (self.shift + 1) % len.max(1);
        Ok(Tick::Hold(self.delay))
    }
}

/// Lights the strip one LED per tick from index 0 upward.
#[derive(Debug, Clone)]
pub struct LoadingSweep {
    pub color: Color,
    pub delay: Duration,
    /// Keep earlier LEDs lit (a filling bar) instead of moving a single dot.
    pub keep_trail: bool,
    /// Clear and start over after a full sweep instead of finishing.
    pub repeat: bool,
    position: usize,
}

impl LoadingSweep {
    pub fn new(color: Color, delay: Duration) -> Self {
        Self {
            color,
            delay,
            keep_trail: true,
            repeat: true,
            position: 0,
        }
    }

    /// One sweep, then the animation finishes.
    pub fn once(mut self) -> Self {
        self.repeat = false;
        self
    }

    /// Only the newest LED stays lit.
    pub fn without_trail(mut self) -> Self {
        self.keep_trail = false;
        self
    }
}

impl Default for LoadingSweep {
    fn default() -> Self {
        Self::new(WARM_LIGHT, Duration::from_millis(100))
    }
}

impl<const CAP: usize> Animation<CAP> for LoadingSweep {
    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        _rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        if self.position < strip.len() {
            if !self.keep_trail && self.position > 0 {
                strip.set_led(self.position - 1, OFF)?;
            }
            strip.set_led(self.position, self.color)?;
            self.position += 1;
            return Ok(Tick::Hold(self.delay));
        }

        if !self.repeat {
            return Ok(Tick::Finished);
        }
        strip.fill(OFF)?;
        self.position = 0;
        Ok(Tick::Hold(self.delay))
    }
}

/// Where flashing takes its colors from.
#[derive(Debug, Clone)]
pub enum FlashColors {
    /// A new random color for every flash.
    Random,
    /// The listed colors in order, wrapping around.
    Cycle(ColorList),
}

/// Whole-strip flashes alternating with dark frames for a bounded time.
///
/// Elapsed time is the sum of the frame holds, so a run of `duration` with
/// `delay` shows `ceil(duration / (2 * delay))` flashes.
#[derive(Debug, Clone)]
pub struct Flashing {
    pub colors: FlashColors,
    pub delay: Duration,
    pub duration: Duration,
    elapsed: Duration,
    lit: bool,
    next_color: usize,
}

impl Flashing {
    pub fn new(colors: FlashColors, delay: Duration, duration: Duration) -> Self {
        Self {
            colors,
            delay,
            duration,
            elapsed: Duration::ZERO,
            lit: false,
            next_color: 0,
        }
    }

    /// Time accounted so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Color {
        match &self.colors {
            FlashColors::Random => colors::random(rng),
            FlashColors::Cycle(list) => {
                let color = list.get(self.next_color % list.len().max(1)).copied();
                self.next_color = (self.next_color + 1) % list.len().max(1);
                color.unwrap_or(OFF)
            }
        }
    }
}

impl Default for Flashing {
    fn default() -> Self {
        Self::new(
            FlashColors::Random,
            Duration::from_millis(300),
            Duration::from_secs(15),
        )
    }
}

impl<const CAP: usize> Animation<CAP> for Flashing {
    fn check(&self, _num_leds: usize) -> Result<(), ValidationError> {
        match &self.colors {
            FlashColors::Cycle(list) if list.is_empty() => Err(ValidationError::EmptyPalette),
            _ => Ok(()),
        }
    }

    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        if self.lit {
            strip.fill(OFF)?;
            self.lit = false;
        } else {
            if self.elapsed >= self.duration {
                return Ok(Tick::Finished);
            }
            let color = self.pick(rng);
            strip.fill(color)?;
            self.lit = true;
        }
        self.elapsed += self.delay;
        Ok(Tick::Hold(self.delay))
    }
}

/// The whole strip fades up and down through a brightness envelope.
#[derive(Debug, Clone)]
pub struct Breathing {
    pub color: Color,
    pub delay: Duration,
    envelope: Envelope,
    position: usize,
}

impl Breathing {
    /// # Errors
    /// * `ZeroSteps` - `steps` is zero
    pub fn new(color: Color, steps: u32, delay: Duration) -> Result<Self, ValidationError> {
        Ok(Self::with_steps(color, envelope_steps(steps)?, delay))
    }

    fn with_steps(color: Color, steps: NonZeroU32, delay: Duration) -> Self {
        Self {
            color,
            delay,
            envelope: Envelope::new(steps, true),
            position: 0,
        }
    }
}

impl Default for Breathing {
    fn default() -> Self {
        Self::with_steps(WARM_LIGHT, const_steps(20), Duration::from_millis(50))
    }
}

impl<const CAP: usize> Animation<CAP> for Breathing {
    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        _rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        let (num, den) = self.envelope.fraction(self.position);
        strip.fill(self.color.scaled_ratio(num, den))?;
        self.position = (self.position + 1) % self.envelope.len();
        Ok(Tick::Hold(self.delay))
    }
}

/// Random LEDs pulse over a dim background. A new set is drawn for every
/// pulse.
#[derive(Debug, Clone)]
pub struct Sparkle<const CAP: usize> {
    pub base_color: Color,
    pub sparkle_color: Color,
    pub sparkle_count: usize,
    pub delay: Duration,
    envelope: Envelope,
    position: usize,
    chosen: Vec<usize, CAP>,
}

impl<const CAP: usize> Sparkle<CAP> {
    /// # Errors
    /// * `ZeroSteps` - `steps` is zero
    pub fn new(
        base_color: Color,
        sparkle_color: Color,
        sparkle_count: usize,
        steps: u32,
        delay: Duration,
    ) -> Result<Self, ValidationError> {
        Ok(Self::with_steps(
            base_color,
            sparkle_color,
            sparkle_count,
            envelope_steps(steps)?,
            delay,
        ))
    }

    fn with_steps(
        base_color: Color,
        sparkle_color: Color,
        sparkle_count: usize,
        steps: NonZeroU32,
        delay: Duration,
    ) -> Self {
        Self {
            base_color,
            sparkle_color,
            sparkle_count,
            delay,
            envelope: Envelope::new(steps, false),
            position: 0,
            chosen: Vec::new(),
        }
    }

    /// LEDs pulsing in the current cycle.
    pub fn chosen(&self) -> &[usize] {
        &self.chosen
    }

    fn choose<R: Rng + ?Sized>(&mut self, num_leds: usize, rng: &mut R) {
        let mut pool: Vec<usize, CAP> = (0..num_leds.min(CAP)).collect();
        let count = self.sparkle_count.min(pool.len());
        let (picked, _) = pool.partial_shuffle(rng, count);
        self.chosen.clear();
        // picked.len() <= CAP
        let _ = self.chosen.extend_from_slice(picked);
    }
}

impl<const CAP: usize> Default for Sparkle<CAP> {
    fn default() -> Self {
        Self::with_steps(
            BLUE.scaled(0.3),
            WHITE,
            50,
            const_steps(5),
            Duration::from_millis(100),
        )
    }
}

impl<const CAP: usize> Animation<CAP> for Sparkle<CAP> {
    fn check(&self, num_leds: usize) -> Result<(), ValidationError> {
        if self.sparkle_count > num_leds {
            return Err(ValidationError::SparkleCountExceedsStrip {
                count: self.sparkle_count,
                num_leds,
            });
        }
        Ok(())
    }

    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        if self.position == 0 {
            strip.fill(self.base_color)?;
            self.choose(strip.len(), rng);
        }

        let (num, den) = self.envelope.fraction(self.position);
        let color = self.sparkle_color.scaled_ratio(num, den);
        for &index in &self.chosen {
            strip.set_led(index, color)?;
        }

        self.position = (self.position + 1) % self.envelope.len();
        Ok(Tick::Hold(self.delay))
    }
}

/// A two-color gradient across the strip, rotating right by one LED per tick.
#[derive(Debug, Clone)]
pub struct GradientShift {
    pub start: Color,
    pub end: Color,
    pub delay: Duration,
    shift: usize,
}

impl GradientShift {
    pub fn new(start: Color, end: Color, delay: Duration) -> Self {
        Self {
            start,
            end,
            delay,
            shift: 0,
        }
    }

    /// Unshifted gradient color at `index` on a strip of `len` LEDs.
    pub fn color_at(&self, index: usize, len: usize) -> Color {
        if len <= 1 {
            return self.start;
        }
        let den = u32::try_from(len - 1).unwrap_or(u32::MAX);
        let num = u32::try_from(index).unwrap_or(u32::MAX).min(den);
        Color::interpolate_ratio(self.start, self.end, num, den)
    }
}

impl Default for GradientShift {
    fn default() -> Self {
        Self::new(RED, BLUE, Duration::from_millis(50))
    }
}

impl<const CAP: usize> Animation<CAP> for GradientShift {
    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        _rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        let len = strip.len();
        for index in 0..len {
            let color = self.color_at(rotated_right(index, self.shift, len), len);
            strip.set_led(index, color)?;
        }
        self.shift = (self.shift + 1) % len.max(1);
        Ok(Tick::Hold(self.delay))
    }
}

/// LED `i` shows `colors[i % colors.len()]`; the palette rotates right by one
/// entry per tick.
#[derive(Debug, Clone)]
pub struct MovingColors {
    pub colors: ColorList,
    pub delay: Duration,
    shift: usize,
}

impl MovingColors {
    pub fn new(colors: ColorList, delay: Duration) -> Self {
        Self {
            colors,
            delay,
            shift: 0,
        }
    }
}

impl Default for MovingColors {
    fn default() -> Self {
        Self::new(rgb_list(), Duration::from_millis(200))
    }
}

impl<const CAP: usize> Animation<CAP> for MovingColors {
    fn check(&self, _num_leds: usize) -> Result<(), ValidationError> {
        if self.colors.is_empty() {
            return Err(ValidationError::EmptyPalette);
        }
        Ok(())
    }

    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        _rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        let count = self.colors.len();
        if count == 0 {
            return Ok(Tick::Hold(self.delay));
        }
        for index in 0..strip.len() {
            let color = self.colors[rotated_right(index % count, self.shift, count)];
            strip.set_led(index, color)?;
        }
        self.shift = (self.shift + 1) % count;
        Ok(Tick::Hold(self.delay))
    }
}

/// One contiguous block per palette color, rotating left by one LED per
/// tick. Blocks are `N / colors.len()` LEDs long and the first
/// `N % colors.len()` colors each take one extra LED.
#[derive(Debug, Clone)]
pub struct MovingBlocks {
    pub colors: ColorList,
    pub delay: Duration,
    shift: usize,
}

impl MovingBlocks {
    pub fn new(colors: ColorList, delay: Duration) -> Self {
        Self {
            colors,
            delay,
            shift: 0,
        }
    }
}

impl Default for MovingBlocks {
    fn default() -> Self {
        Self::new(rgb_list(), Duration::from_millis(200))
    }
}

impl<const CAP: usize> Animation<CAP> for MovingBlocks {
    fn check(&self, _num_leds: usize) -> Result<(), ValidationError> {
        if self.colors.is_empty() {
            return Err(ValidationError::EmptyPalette);
        }
        Ok(())
    }

    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        _rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        if self.colors.is_empty() {
            return Ok(Tick::Hold(self.delay));
        }
        let len = strip.len();
        for index in 0..len {
            let color = block_color(rotated_left(index, self.shift, len), len, &self.colors);
            strip.set_led(index, color)?;
        }
        self.shift = (self.shift + 1) % len.max(1);
        Ok(Tick::Hold(self.delay))
    }
}

/// LEDs lit at `radius` around `center`: at most the two fronts, clamped to
/// `0..len`.
pub fn lit_indices(center: usize, radius: usize, len: usize) -> Vec<usize, 2> {
    let mut lit = Vec::new();
    if let Some(left) = center.checked_sub(radius).filter(|&left| left < len) {
        let _ = lit.push(left);
    }
    let right = center.saturating_add(radius);
    if right < len && !lit.contains(&right) {
        let _ = lit.push(right);
    }
    lit
}

#[derive(Debug, Clone)]
struct Burst {
    center: usize,
    color: Color,
    radius: usize,
    lit: Vec<usize, 2>,
}

/// Explosions at random positions: two fronts run outward from the center,
/// one LED per tick, until both ends are passed.
///
/// Only LEDs that enter or leave the lit set are written.
#[derive(Debug, Clone)]
pub struct Firework {
    pub delay: Duration,
    burst: Option<Burst>,
}

impl Firework {
    pub fn new(delay: Duration) -> Self {
        Self { delay, burst: None }
    }

    /// Starts the next explosion at `center` with `color` instead of a random
    /// one. Replaces an explosion in progress without clearing it.
    pub fn ignite(&mut self, center: usize, color: Color) {
        self.burst = Some(Burst {
            center,
            color,
            radius: 0,
            lit: Vec::new(),
        });
    }

    /// Center of the explosion in progress.
    pub fn center(&self) -> Option<usize> {
        self.burst.as_ref().map(|burst| burst.center)
    }

    /// LEDs currently lit by the explosion.
    pub fn lit(&self) -> &[usize] {
        self.burst.as_ref().map_or(&[], |burst| &burst.lit[..])
    }
}

impl Default for Firework {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

impl<const CAP: usize> Animation<CAP> for Firework {
    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        let len = strip.len();
        if len == 0 {
            return Ok(Tick::Hold(self.delay));
        }

        if self.burst.is_none() {
            let center = rng.random_range(0..len);
            let color = colors::random(rng);
            log::debug!("firework: burst at {} in {}", center, color);
            self.ignite(center, color);
        }
        let Some(burst) = self.burst.as_mut() else {
            return Ok(Tick::Hold(self.delay));
        };

        let max_radius = burst.center.max(len - 1 - burst.center.min(len - 1));
        if burst.radius > max_radius {
            for &index in &burst.lit {
                strip.set_led(index, OFF)?;
            }
            self.burst = None;
            return Ok(Tick::Hold(self.delay));
        }

        let next = lit_indices(burst.center, burst.radius, len);
        for &index in burst.lit.iter().filter(|index| !next.contains(index)) {
            strip.set_led(index, OFF)?;
        }
        for &index in next.iter().filter(|index| !burst.lit.contains(index)) {
            strip.set_led(index, burst.color)?;
        }
        burst.lit = next;
        burst.radius += 1;
        Ok(Tick::Hold(self.delay))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PomodoroPhase {
    Start,
    Countdown { next: usize },
    Finale,
}

/// Focus timer: the strip starts fully lit and one LED, from the far end,
/// drops to a dim level every `length / num_leds`. When the last LED has
/// dimmed the `finale` flashing runs.
#[derive(Debug, Clone)]
pub struct Pomodoro {
    pub color: Color,
    pub length: Duration,
    /// Brightness of an elapsed LED, in `0.0..=1.0`.
    pub dim_factor: f64,
    pub finale: Flashing,
    phase: PomodoroPhase,
}

impl Pomodoro {
    pub fn new(color: Color, length: Duration) -> Self {
        Self {
            color,
            length,
            dim_factor: 0.2,
            finale: Flashing::default(),
            phase: PomodoroPhase::Start,
        }
    }

    /// Time each LED represents.
    pub fn pace(&self, num_leds: usize) -> Duration {
        let divisor = u32::try_from(num_leds).unwrap_or(u32::MAX).max(1);
        self.length / divisor
    }

    /// True once the countdown is over and the finale is running.
    pub fn in_finale(&self) -> bool {
        self.phase == PomodoroPhase::Finale
    }
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new(BLUE, Duration::from_secs(25 * 60))
    }
}

impl<const CAP: usize> Animation<CAP> for Pomodoro {
    fn check(&self, num_leds: usize) -> Result<(), ValidationError> {
        if num_leds == 0 {
            return Err(ValidationError::EmptyStrip);
        }
        self.color.dim(self.dim_factor)?;
        Animation::<CAP>::check(&self.finale, num_leds)
    }

    fn advance<D: LedDriver, R: Rng + ?Sized>(
        &mut self,
        strip: &mut StripState<D, CAP>,
        rng: &mut R,
    ) -> Result<Tick, StripError<D::Error>> {
        let len = strip.len();
        let pace = self.pace(len);

        match self.phase {
            PomodoroPhase::Start => {
                strip.fill(self.color)?;
                if len == 0 {
                    self.phase = PomodoroPhase::Finale;
                    return Ok(Tick::Hold(Duration::ZERO));
                }
                self.phase = PomodoroPhase::Countdown { next: len - 1 };
                log::info!("pomodoro: {:?} per LED over {} LEDs", pace, len);
                Ok(Tick::Hold(pace))
            }
            PomodoroPhase::Countdown { next } => {
                strip.set_led(next, self.color.scaled(self.dim_factor))?;
                let done = len - next;
                log::info!("pomodoro: LED {} dimmed, {:?} elapsed", next, pace * done as u32);
                if next == 0 {
                    self.phase = PomodoroPhase::Finale;
                    return Ok(Tick::Hold(Duration::ZERO));
                }
                self.phase = PomodoroPhase::Countdown { next: next - 1 };
                Ok(Tick::Hold(pace))
            }
            PomodoroPhase::Finale => self.finale.advance(strip, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_indices_clamp_to_the_strip() {
        assert_eq!(lit_indices(0, 0, 5).as_slice(), &[0]);
        assert_eq!(lit_indices(0, 1, 5).as_slice(), &[1]);
        assert_eq!(lit_indices(2, 2, 5).as_slice(), &[0, 4]);
        assert_eq!(lit_indices(4, 2, 5).as_slice(), &[2]);
        assert!(lit_indices(2, 3, 5).is_empty());
    }

    #[test]
    fn pomodoro_pace_splits_length_over_leds() {
        let pomodoro = Pomodoro::new(BLUE, Duration::from_secs(60));
        assert_eq!(pomodoro.pace(4), Duration::from_secs(15));
        assert_eq!(pomodoro.pace(0), Duration::from_secs(60));
    }

    #[test]
    fn default_sparkle_base_is_dim_blue() {
        let sparkle = Sparkle::<8>::default();
        assert_eq!(sparkle.base_color, Color::new(0, 0, 76));
    }
}
