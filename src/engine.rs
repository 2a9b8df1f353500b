//! Animation engine: one strip, at most one running animation.
//!
//! Provides [`AnimationEngine`], which owns the [`StripState`] and the random
//! source, dispatches one-shot commands, and drives an [`Animation`] either one
//! tick at a time ([`AnimationEngine::service`]) or in a blocking loop with
//! cancellation ([`AnimationEngine::run`]). Every way out of a running
//! animation leaves the strip all-off.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use rand::Rng;

use crate::animation::{Animation, BuiltinAnimation, Tick};
use crate::color::Color;
use crate::colors::RED;
use crate::command::{StatusReport, StripCommand};
use crate::strip::{LedDriver, StripState};
use crate::time::sleep_for;
use crate::types::{StripError, ValidationError};

/// The current state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// No animation. One-shot commands are accepted.
    Idle,
    /// An animation holds the strip.
    Running,
    /// A bounded animation finished and the strip was cleared.
    Complete,
}

/// When the engine needs to be serviced again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceTiming {
    /// Hold the current frame for this long, then call `service` again.
    Delay(Duration),

    /// Nothing left to service.
    Complete,
}

/// How a blocking [`AnimationEngine::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunOutcome {
    /// The stop signal was raised.
    Stopped,
    /// A bounded animation reached its end.
    Completed,
}

/// Errors that can occur during engine operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError<E> {
    /// Strip write or flush failed.
    Strip(StripError<E>),

    /// The request was rejected before anything was applied.
    Validation(ValidationError),

    /// Operation called from an invalid state.
    InvalidState {
        /// Human-readable description of the expected state(s)
        expected: &'static str,
        /// The actual current state
        actual: EngineState,
    },

    /// An animation holds the strip; stop it first.
    Busy,
}

impl<E: core::fmt::Debug> core::fmt::Display for EngineError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EngineError::Strip(err) => write!(f, "{}", err),
            EngineError::Validation(err) => write!(f, "invalid request: {}", err),
            EngineError::InvalidState { expected, actual } => {
                write!(
                    f,
                    "invalid state: expected {}, but engine is {:?}",
                    expected, actual
                )
            }
            EngineError::Busy => write!(f, "an animation is running; stop it first"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for EngineError<E> {}

impl<E> From<StripError<E>> for EngineError<E> {
    fn from(err: StripError<E>) -> Self {
        EngineError::Strip(err)
    }
}

impl<E> From<ValidationError> for EngineError<E> {
    fn from(err: ValidationError) -> Self {
        EngineError::Validation(err)
    }
}

/// Cancellation flag checked by [`AnimationEngine::run`] once per tick.
///
/// Raise it from another thread, an interrupt handler or a signal handler.
/// It stays raised until [`reset`](StopSignal::reset).
#[derive(Debug, Default)]
pub struct StopSignal {
    raised: AtomicBool,
}

impl StopSignal {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

/// Drives animations on one strip.
///
/// # Type Parameters
/// * `D` - Driver implementation
/// * `R` - Random source used by animations
/// * `CAP` - Maximum number of LEDs
/// * `A` - Animation type, the built-in set by default
pub struct AnimationEngine<D, R, const CAP: usize, A = BuiltinAnimation<CAP>>
where
    D: LedDriver,
    R: Rng,
    A: Animation<CAP>,
{
    strip: StripState<D, CAP>,
    rng: R,
    state: EngineState,
    animation: Option<A>,
}

impl<D, R, const CAP: usize, A> AnimationEngine<D, R, CAP, A>
where
    D: LedDriver,
    R: Rng,
    A: Animation<CAP>,
{
    /// Creates an idle engine. The strip is not touched.
    pub fn new(strip: StripState<D, CAP>, rng: R) -> Self {
        Self {
            strip,
            rng,
            state: EngineState::Idle,
            animation: None,
        }
    }

    /// Handles a command by dispatching to the matching method.
    ///
    /// # Returns
    /// * `Ok(ServiceTiming)` - From `Start`: when to service next
    /// * `Ok(ServiceTiming::Complete)` - For commands that need no servicing
    /// * `Err` - Rejected request, busy strip or hardware failure
    pub fn handle(
        &mut self,
        command: StripCommand<A>,
    ) -> Result<ServiceTiming, EngineError<D::Error>> {
        match command {
            StripCommand::PowerOn => {
                self.power_on()?;
                Ok(ServiceTiming::Complete)
            }
            StripCommand::PowerOff => {
                self.power_off()?;
                Ok(ServiceTiming::Complete)
            }
            StripCommand::SetColor(color) => {
                self.set_color(color)?;
                Ok(ServiceTiming::Complete)
            }
            StripCommand::Start(animation) => self.start(animation),
            StripCommand::Stop => {
                self.stop()?;
                Ok(ServiceTiming::Complete)
            }
        }
    }

    /// Fills the strip red.
    pub fn power_on(&mut self) -> Result<(), EngineError<D::Error>> {
        self.set_color(RED)
    }

    /// Turns every LED off.
    pub fn power_off(&mut self) -> Result<(), EngineError<D::Error>> {
        self.ensure_free()?;
        self.strip.clear()?;
        Ok(())
    }

    /// Fills the strip with `color` and flushes.
    ///
    /// Fails with `Busy` while an animation is running.
    pub fn set_color(&mut self, color: Color) -> Result<(), EngineError<D::Error>> {
        self.ensure_free()?;
        self.strip.fill(color)?;
        self.strip.flush()?;
        Ok(())
    }

    /// Parses `hex` and fills the strip with it. Nothing is written if the
    /// string is malformed.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), EngineError<D::Error>> {
        let color = Color::from_hex(hex)?;
        self.set_color(color)
    }

    /// Starts `animation` and renders its first frame.
    ///
    /// Must be called from `Idle` or `Complete`.
    ///
    /// # Returns
    /// * `Ok(ServiceTiming)` - When to service next
    /// * `Err(Busy)` - Another animation is running
    /// * `Err(Validation)` - The animation cannot run on this strip
    pub fn start(&mut self, animation: A) -> Result<ServiceTiming, EngineError<D::Error>> {
        self.ensure_free()?;
        animation.check(self.strip.len())?;

        log::info!("animation started on {} LEDs", self.strip.len());
        self.animation = Some(animation);
        self.state = EngineState::Running;
        self.service()
    }

    /// Renders and flushes the next frame.
    ///
    /// Must be called from `Running` state.
    ///
    /// # Returns
    /// - `Ok(ServiceTiming::Delay(d))` - Hold the frame for `d`
    /// - `Ok(ServiceTiming::Complete)` - Bounded animation finished; the strip
    ///   has been cleared and the engine is `Complete`
    /// - `Err` - Invalid state, or a hardware failure that ended the
    ///   animation (the engine is `Idle` again)
    pub fn service(&mut self) -> Result<ServiceTiming, EngineError<D::Error>> {
        let invalid = EngineError::InvalidState {
            expected: "Running",
            actual: self.state,
        };
        if self.state != EngineState::Running {
            return Err(invalid);
        }
        let Some(animation) = self.animation.as_mut() else {
            return Err(invalid);
        };

        match render(animation, &mut self.strip, &mut self.rng) {
            Ok(Tick::Hold(hold)) => Ok(ServiceTiming::Delay(hold)),
            Ok(Tick::Finished) => {
                log::info!("animation completed");
                self.release(EngineState::Complete)?;
                Ok(ServiceTiming::Complete)
            }
            Err(err) => {
                log::error!("animation aborted: {}", err);
                self.abort();
                Err(err.into())
            }
        }
    }

    /// Stops the running animation and clears the strip.
    ///
    /// Must be called from `Running` state.
    pub fn stop(&mut self) -> Result<(), EngineError<D::Error>> {
        if self.state != EngineState::Running {
            return Err(EngineError::InvalidState {
                expected: "Running",
                actual: self.state,
            });
        }
        log::info!("animation stopped");
        self.release(EngineState::Idle)
    }

    /// Runs `animation` until it completes or `stop` is raised.
    ///
    /// Each tick renders a frame, flushes it, checks `stop` once, then sleeps
    /// for the frame's hold time. The strip is cleared on every way out: stop,
    /// completion, hardware failure, or a panic unwinding through the loop.
    pub fn run<T: DelayNs + ?Sized>(
        &mut self,
        animation: A,
        delay: &mut T,
        stop: &StopSignal,
    ) -> Result<RunOutcome, EngineError<D::Error>> {
        let guard = ClearOnExit { engine: self };
        let mut timing = guard.engine.start(animation)?;

        loop {
            let hold = match timing {
                ServiceTiming::Complete => return Ok(RunOutcome::Completed),
                ServiceTiming::Delay(hold) => hold,
            };
            if stop.is_raised() {
                guard.engine.stop()?;
                return Ok(RunOutcome::Stopped);
            }
            sleep_for(delay, hold);
            timing = guard.engine.service()?;
        }
    }

    /// Snapshot for the command surface.
    pub fn status(&self) -> StatusReport<CAP> {
        StatusReport::from_strip(&self.strip)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn strip(&self) -> &StripState<D, CAP> {
        &self.strip
    }

    /// The running animation, if any.
    pub fn animation(&self) -> Option<&A> {
        self.animation.as_ref()
    }

    pub fn into_parts(self) -> (StripState<D, CAP>, R) {
        (self.strip, self.rng)
    }

    fn ensure_free(&self) -> Result<(), EngineError<D::Error>> {
        if self.state == EngineState::Running {
            return Err(EngineError::Busy);
        }
        Ok(())
    }

    /// Ends the animation and clears the strip, reporting a failed clear.
    fn release(&mut self, next: EngineState) -> Result<(), EngineError<D::Error>> {
        self.animation = None;
        self.state = next;
        self.strip.clear()?;
        Ok(())
    }

    /// Ends the animation after a failure. The clear is best effort.
    fn abort(&mut self) {
        self.animation = None;
        self.state = EngineState::Idle;
        if let Err(err) = self.strip.clear() {
            log::warn!("could not clear strip after failure: {}", err);
        }
    }
}

/// One tick: advance, then flush.
fn render<A, D, R, const CAP: usize>(
    animation: &mut A,
    strip: &mut StripState<D, CAP>,
    rng: &mut R,
) -> Result<Tick, StripError<D::Error>>
where
    A: Animation<CAP>,
    D: LedDriver,
    R: Rng,
{
    let tick = animation.advance(strip, rng)?;
    strip.flush()?;
    Ok(tick)
}

/// Clears the strip if `run` leaves while the engine still counts as running.
struct ClearOnExit<'e, D, R, const CAP: usize, A>
where
    D: LedDriver,
    R: Rng,
    A: Animation<CAP>,
{
    engine: &'e mut AnimationEngine<D, R, CAP, A>,
}

impl<D, R, const CAP: usize, A> Drop for ClearOnExit<'_, D, R, CAP, A>
where
    D: LedDriver,
    R: Rng,
    A: Animation<CAP>,
{
    fn drop(&mut self) {
        if self.engine.is_running() {
            self.engine.abort();
        }
    }
}
