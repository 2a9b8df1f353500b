//! Shared test infrastructure for strip-animator integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use strip_animator::{AnimationEngine, Color, LedDriver, StopSignal, StripState};

/// Capacity used by every test strip.
pub const TEST_CAP: usize = 64;

// ============================================================================
// Mock Driver
// ============================================================================

/// Error reported by [`MockDriver`] when a failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Mock driver that records every write and every flushed frame.
///
/// Failures are one-shot: the write (or flush) with the configured ordinal
/// fails, later ones succeed again.
pub struct MockDriver {
    staged: Vec<Color>,
    writes: Vec<(usize, Color)>,
    frames: Vec<Vec<Color>>,
    fail_on_write: Option<usize>,
    fail_on_flush: Option<usize>,
}

impl MockDriver {
    pub fn new(num_leds: usize) -> Self {
        Self {
            staged: vec![Color::default(); num_leds],
            writes: Vec::new(),
            frames: Vec::new(),
            fail_on_write: None,
            fail_on_flush: None,
        }
    }

    /// The `ordinal`-th write (0-based) fails.
    pub fn failing_write(mut self, ordinal: usize) -> Self {
        self.fail_on_write = Some(ordinal);
        self
    }

    /// The `ordinal`-th flush (0-based) fails.
    pub fn failing_flush(mut self, ordinal: usize) -> Self {
        self.fail_on_flush = Some(ordinal);
        self
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> &[(usize, Color)] {
        &self.writes
    }

    /// Forgets recorded writes, keeping frames and staged colors.
    pub fn take_writes(&mut self) -> Vec<(usize, Color)> {
        core::mem::take(&mut self.writes)
    }

    /// Every successfully flushed frame, in order.
    pub fn frames(&self) -> &[Vec<Color>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[Color]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn flush_count(&self) -> usize {
        self.frames.len()
    }
}

impl LedDriver for MockDriver {
    type Error = MockError;

    fn set_led(&mut self, index: usize, red: u8, green: u8, blue: u8) -> Result<(), MockError> {
        let ordinal = self.writes.len();
        if self.fail_on_write == Some(ordinal) {
            self.fail_on_write = None;
            return Err(MockError);
        }
        let color = Color::new(red, green, blue);
        self.staged[index] = color;
        self.writes.push((index, color));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockError> {
        if self.fail_on_flush == Some(self.frames.len()) {
            self.fail_on_flush = None;
            return Err(MockError);
        }
        self.frames.push(self.staged.clone());
        Ok(())
    }
}

// ============================================================================
// Mock Delay
// ============================================================================

/// Delay that returns immediately and records what was requested.
///
/// Optionally raises a stop signal once a number of sleeps have happened.
pub struct MockDelay<'a> {
    sleeps: Vec<Duration>,
    stop_after: Option<(usize, &'a StopSignal)>,
}

impl<'a> MockDelay<'a> {
    pub fn new() -> Self {
        Self {
            sleeps: Vec::new(),
            stop_after: None,
        }
    }

    /// Raises `stop` after the `count`-th sleep.
    pub fn stopping_after(count: usize, stop: &'a StopSignal) -> Self {
        Self {
            sleeps: Vec::new(),
            stop_after: Some((count, stop)),
        }
    }

    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    pub fn total(&self) -> Duration {
        self.sleeps.iter().sum()
    }

    fn record(&mut self, slept: Duration) {
        self.sleeps.push(slept);
        if let Some((count, stop)) = self.stop_after {
            if self.sleeps.len() >= count {
                stop.raise();
            }
        }
    }
}

impl DelayNs for MockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.record(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.record(Duration::from_micros(u64::from(us)));
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

pub type TestStrip = StripState<MockDriver, TEST_CAP>;
pub type TestEngine = AnimationEngine<MockDriver, SmallRng, TEST_CAP>;

pub fn rng() -> SmallRng {
    SmallRng::seed_from_u64(0x5eed)
}

pub fn strip(num_leds: usize) -> TestStrip {
    StripState::new(MockDriver::new(num_leds), num_leds).unwrap()
}

pub fn engine(num_leds: usize) -> TestEngine {
    AnimationEngine::new(strip(num_leds), rng())
}

pub fn engine_with(driver: MockDriver, num_leds: usize) -> TestEngine {
    AnimationEngine::new(StripState::new(driver, num_leds).unwrap(), rng())
}

pub fn all_off(colors: &[Color]) -> bool {
    colors.iter().all(|color| color.is_off())
}
