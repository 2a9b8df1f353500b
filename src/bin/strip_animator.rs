use std::io::{self, BufRead, Stdout, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use strip_animator::{
    AnimationEngine, AnimationKind, Color, DEFAULT_CAPACITY, LedDriver, RunOutcome, StdDelay,
    StopSignal, StripState,
};

/// Preview LED strip colors and animations in the terminal.
#[derive(Parser, Debug)]
#[command(name = "strip-animator")]
#[command(about = "Drive an addressable LED strip with static colors or animations")]
#[command(group(ArgGroup::new("mode").required(true).args(["color", "animation"])))]
struct Args {
    /// Static color as a hex string, e.g. "#ffdc52"
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,

    /// Animation to run until it completes or Enter is pressed
    #[arg(long, value_enum)]
    animation: Option<AnimationKind>,

    /// Number of LEDs on the strip
    #[arg(long, default_value = "300", value_parser = clap::value_parser!(u16).range(1..=DEFAULT_CAPACITY as i64))]
    num_leds: u16,

    /// Override the animation's per-tick delay
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn parse_color(s: &str) -> Result<Color, String> {
    s.parse().map_err(|e| format!("Invalid color: {}", e))
}

/// Renders each flush as one row of true-color blocks.
struct TerminalDriver {
    out: Stdout,
    staged: Vec<Color>,
}

impl TerminalDriver {
    fn new(num_leds: usize) -> Self {
        Self {
            out: io::stdout(),
            staged: vec![Color::default(); num_leds],
        }
    }
}

impl LedDriver for TerminalDriver {
    type Error = io::Error;

    fn set_led(&mut self, index: usize, red: u8, green: u8, blue: u8) -> io::Result<()> {
        let slot = self.staged.get_mut(index).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("no LED at {}", index))
        })?;
        *slot = Color::new(red, green, blue);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut out = self.out.lock();
        write!(out, "\r")?;
        for color in &self.staged {
            write!(
                out,
                "\x1b[48;2;{};{};{}m ",
                color.red, color.green, color.blue
            )?;
        }
        write!(out, "\x1b[0m")?;
        out.flush()
    }
}

/// Raises `stop` once a line arrives on stdin.
///
/// A closed stdin (EOF or a read error) never stops the animation.
fn watch_stdin(stop: Arc<StopSignal>) {
    thread::spawn(move || {
        let mut line = String::new();
        if is_stop_request(io::stdin().lock().read_line(&mut line)) {
            stop.raise();
        }
    });
}

fn is_stop_request(read: io::Result<usize>) -> bool {
    matches!(read, Ok(n) if n > 0)
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let num_leds = usize::from(args.num_leds);

    let strip = StripState::<_, DEFAULT_CAPACITY>::new(TerminalDriver::new(num_leds), num_leds)?;
    let mut engine = AnimationEngine::new(strip, SmallRng::from_os_rng());

    if let Some(color) = args.color {
        engine.set_color(color).context("setting static color")?;
        println!();
        return Ok(());
    }

    let Some(kind) = args.animation else {
        anyhow::bail!("either --color or --animation is required");
    };
    let mut animation = kind.default_animation(num_leds);
    if let Some(delay_ms) = args.delay_ms {
        animation.set_delay(Duration::from_millis(delay_ms));
    }

    println!("Running {} on {} LEDs, press Enter to stop", kind, num_leds);
    let stop = Arc::new(StopSignal::new());
    watch_stdin(Arc::clone(&stop));

    let outcome = engine
        .run(animation, &mut StdDelay, &stop)
        .with_context(|| format!("running {}", kind))?;
    println!();
    match outcome {
        RunOutcome::Stopped => log::info!("{} stopped", kind),
        RunOutcome::Completed => log::info!("{} completed", kind),
    }
    Ok(())
}
