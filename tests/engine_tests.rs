//! Integration tests for AnimationEngine

mod common;
use common::*;

use core::time::Duration;

use strip_animator::animation::color_list;
use strip_animator::colors::{GREEN, RED, WHITE};
use strip_animator::effects::{LoadingSweep, MovingColors, Pomodoro, RotatingBands, Sparkle};
use strip_animator::{
    AnimationKind, BuiltinAnimation, Color, EngineError, EngineState, PowerState, RunOutcome,
    ServiceTiming, StopSignal, StripCommand, StripError, ValidationError,
};

fn bands() -> BuiltinAnimation<TEST_CAP> {
    RotatingBands::default().into()
}

// ============================================================================
// One-shot commands
// ============================================================================

#[test]
fn power_on_fills_the_strip_red() {
    let mut engine = engine(6);
    engine.power_on().unwrap();

    let driver = engine.strip().driver();
    assert_eq!(driver.flush_count(), 1);
    assert_eq!(driver.last_frame().unwrap(), &[RED; 6][..]);

    let status = engine.status();
    assert_eq!(status.power, PowerState::On);
    assert_eq!(status.num_leds, 6);
    let current = status.current_color.unwrap();
    assert_eq!(current.rgb, RED);
    assert_eq!(current.hex.as_str(), "#ff0000");
}

#[test]
fn power_off_turns_everything_off() {
    let mut engine = engine(6);
    engine.power_on().unwrap();
    engine.power_off().unwrap();

    assert!(all_off(engine.strip().driver().last_frame().unwrap()));
    let status = engine.status();
    assert_eq!(status.power, PowerState::Off);
    assert!(all_off(&status.per_led_state));
}

#[test]
fn set_color_hex_applies_the_parsed_color() {
    let mut engine = engine(3);
    engine.set_color_hex("#ffdc52").unwrap();

    assert_eq!(engine.strip().uniform_color(), Some(Color::new(255, 220, 82)));
    assert_eq!(engine.status().current_color.unwrap().hex.as_str(), "#ffdc52");
}

#[test]
fn malformed_hex_writes_nothing() {
    let mut engine = engine(3);
    let result = engine.set_color_hex("#12345");

    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::InvalidHexLength(5)))
    ));
    assert!(engine.strip().driver().writes().is_empty());
    assert_eq!(engine.strip().driver().flush_count(), 0);
}

#[test]
fn status_has_no_current_color_for_mixed_strips() {
    let mut engine = engine(5);
    let moving = MovingColors::default();
    engine.start(moving.into()).unwrap();

    let status = engine.status();
    assert_eq!(status.power, PowerState::On);
    assert!(status.current_color.is_none());
    assert_eq!(status.per_led_state.len(), 5);
}

#[test]
fn commands_dispatch_to_engine_operations() {
    let mut engine = engine(4);

    let timing = engine.handle(StripCommand::SetColor(GREEN)).unwrap();
    assert_eq!(timing, ServiceTiming::Complete);
    assert_eq!(engine.strip().uniform_color(), Some(GREEN));

    let timing = engine.handle(StripCommand::Start(bands())).unwrap();
    assert_eq!(timing, ServiceTiming::Delay(Duration::from_millis(100)));
    assert!(engine.is_running());

    engine.handle(StripCommand::Stop).unwrap();
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(all_off(engine.strip().as_slice()));

    engine.handle(StripCommand::PowerOn).unwrap();
    assert_eq!(engine.strip().uniform_color(), Some(RED));
    engine.handle(StripCommand::PowerOff).unwrap();
    assert!(!engine.strip().is_powered());
}

// ============================================================================
// Exclusivity and validation
// ============================================================================

#[test]
fn one_shot_commands_are_rejected_while_running() {
    let mut engine = engine(4);
    engine.start(bands()).unwrap();
    let writes = engine.strip().driver().writes().len();

    assert!(matches!(engine.set_color(WHITE), Err(EngineError::Busy)));
    assert!(matches!(engine.power_on(), Err(EngineError::Busy)));
    assert!(matches!(engine.power_off(), Err(EngineError::Busy)));
    assert!(matches!(engine.start(bands()), Err(EngineError::Busy)));
    assert_eq!(engine.strip().driver().writes().len(), writes);

    engine.stop().unwrap();
    engine.set_color(WHITE).unwrap();
    assert_eq!(engine.strip().uniform_color(), Some(WHITE));
}

#[test]
fn invalid_animations_are_rejected_before_the_first_frame() {
    let mut engine = engine(4);

    let empty = MovingColors::new(Default::default(), Duration::from_millis(1));
    assert!(matches!(
        engine.start(empty.into()),
        Err(EngineError::Validation(ValidationError::EmptyPalette))
    ));

    let sparkle = Sparkle::<TEST_CAP>::new(RED, WHITE, 5, 5, Duration::from_millis(1)).unwrap();
    assert!(matches!(
        engine.start(sparkle.into()),
        Err(EngineError::Validation(ValidationError::SparkleCountExceedsStrip { .. }))
    ));

    assert_eq!(engine.state(), EngineState::Idle);
    assert!(engine.strip().driver().writes().is_empty());
}

#[test]
fn pomodoro_cannot_run_on_an_empty_strip() {
    let mut engine = engine(0);
    let result = engine.start(Pomodoro::default().into());
    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::EmptyStrip))
    ));
}

#[test]
fn capacity_is_enforced_at_construction() {
    let result = strip_animator::StripState::<_, 4>::new(MockDriver::new(8), 8);
    assert!(matches!(
        result,
        Err(ValidationError::CapacityExceeded {
            requested: 8,
            capacity: 4
        })
    ));
}

// ============================================================================
// Servicing
// ============================================================================

#[test]
fn service_renders_and_flushes_one_frame_per_call() {
    let mut engine = engine(4);
    engine.start(bands()).unwrap();
    assert_eq!(engine.strip().driver().flush_count(), 1);

    for expected in 2..5 {
        let timing = engine.service().unwrap();
        assert_eq!(timing, ServiceTiming::Delay(Duration::from_millis(100)));
        assert_eq!(engine.strip().driver().flush_count(), expected);
    }
}

#[test]
fn bounded_animation_completes_and_clears() {
    let mut engine = engine(2);
    let loading = LoadingSweep::new(WHITE, Duration::from_millis(5)).once();

    engine.start(loading.into()).unwrap();
    engine.service().unwrap();
    let timing = engine.service().unwrap();

    assert_eq!(timing, ServiceTiming::Complete);
    assert_eq!(engine.state(), EngineState::Complete);
    assert!(engine.animation().is_none());
    assert!(all_off(engine.strip().driver().last_frame().unwrap()));

    // A completed engine accepts new work.
    engine.set_color(RED).unwrap();
}

// ============================================================================
// Blocking run with cancellation
// ============================================================================

#[test]
fn run_stops_on_signal_and_leaves_strip_off() {
    let mut engine = engine(8);
    let stop = StopSignal::new();
    let mut delay = MockDelay::stopping_after(3, &stop);

    let outcome = engine.run(bands(), &mut delay, &stop).unwrap();

    assert_eq!(outcome, RunOutcome::Stopped);
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(delay.sleeps(), &[Duration::from_millis(100); 3][..]);

    let driver = engine.strip().driver();
    // Four animation frames, then the clear.
    assert_eq!(driver.flush_count(), 5);
    assert!(driver.frames()[3].iter().any(|color| !color.is_off()));
    assert!(all_off(driver.last_frame().unwrap()));
}

#[test]
fn run_with_signal_already_raised_renders_one_frame() {
    let mut engine = engine(4);
    let stop = StopSignal::new();
    stop.raise();
    let mut delay = MockDelay::new();

    let outcome = engine.run(bands(), &mut delay, &stop).unwrap();

    assert_eq!(outcome, RunOutcome::Stopped);
    assert!(delay.sleeps().is_empty());
    assert_eq!(engine.strip().driver().flush_count(), 2);
    assert!(all_off(engine.strip().as_slice()));
}

#[test]
fn run_returns_when_a_bounded_animation_completes() {
    let mut engine = engine(4);
    let stop = StopSignal::new();
    let mut delay = MockDelay::new();
    let loading = LoadingSweep::new(WHITE, Duration::from_millis(20)).once();

    let outcome = engine.run(loading.into(), &mut delay, &stop).unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(engine.state(), EngineState::Complete);
    assert_eq!(delay.total(), Duration::from_millis(80));
    assert!(all_off(engine.strip().driver().last_frame().unwrap()));
}

#[test]
fn run_counts_down_a_pomodoro_and_clears() {
    let mut engine = engine(4);
    let stop = StopSignal::new();
    let mut delay = MockDelay::new();
    let mut pomodoro = Pomodoro::new(GREEN, Duration::from_secs(60));
    pomodoro.finale = strip_animator::effects::Flashing::new(
        strip_animator::effects::FlashColors::Cycle(color_list(&[WHITE]).unwrap()),
        Duration::from_millis(100),
        Duration::from_millis(400),
    );

    let outcome = engine.run(pomodoro.into(), &mut delay, &stop).unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    // Four LEDs at 15 s each, then four finale frames.
    assert_eq!(
        delay.total(),
        Duration::from_secs(60) + Duration::from_millis(400)
    );
    assert!(all_off(engine.strip().driver().last_frame().unwrap()));
}

#[test]
fn hardware_write_failure_aborts_and_clears() {
    // Frame one takes writes 0..4; the second frame fails part way.
    let driver = MockDriver::new(4).failing_write(5);
    let mut engine = engine_with(driver, 4);
    let stop = StopSignal::new();
    let mut delay = MockDelay::new();

    let result = engine.run(bands(), &mut delay, &stop);

    assert!(matches!(
        result,
        Err(EngineError::Strip(StripError::Hardware(MockError)))
    ));
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(engine.animation().is_none());
    assert!(all_off(engine.strip().as_slice()));
    assert!(all_off(engine.strip().driver().last_frame().unwrap()));
}

#[test]
fn flush_failure_aborts_and_clears() {
    let driver = MockDriver::new(4).failing_flush(2);
    let mut engine = engine_with(driver, 4);
    engine.start(bands()).unwrap();
    engine.service().unwrap();

    let result = engine.service();

    assert!(matches!(
        result,
        Err(EngineError::Strip(StripError::Hardware(MockError)))
    ));
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(all_off(engine.strip().driver().last_frame().unwrap()));
}

#[test]
fn engine_can_run_again_after_a_stop() {
    let mut engine = engine(4);
    let stop = StopSignal::new();

    let mut delay = MockDelay::stopping_after(1, &stop);
    engine.run(bands(), &mut delay, &stop).unwrap();
    stop.reset();

    let mut delay = MockDelay::stopping_after(2, &stop);
    let outcome = engine
        .run(AnimationKind::Breathing.default_animation(4), &mut delay, &stop)
        .unwrap();
    assert_eq!(outcome, RunOutcome::Stopped);
    assert!(all_off(engine.strip().as_slice()));
}

#[test]
fn every_default_animation_starts_and_stops_cleanly() {
    for kind in AnimationKind::ALL {
        let mut engine = engine(10);
        let stop = StopSignal::new();
        let mut delay = MockDelay::stopping_after(3, &stop);

        let outcome = engine
            .run(kind.default_animation(10), &mut delay, &stop)
            .unwrap();

        assert_eq!(outcome, RunOutcome::Stopped, "{}", kind);
        assert!(all_off(engine.strip().as_slice()), "{}", kind);
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[cfg(feature = "serde")]
#[test]
fn status_report_serializes_to_json() {
    let mut engine = engine(2);
    engine.set_color(Color::new(1, 2, 3)).unwrap();

    let json = serde_json::to_value(engine.status()).unwrap();

    assert_eq!(json["power"], "on");
    assert_eq!(json["num_leds"], 2);
    assert_eq!(json["current_color"]["hex"], "#010203");
    assert_eq!(json["current_color"]["rgb"]["green"], 2);
    assert_eq!(json["per_led_state"].as_array().unwrap().len(), 2);
}
