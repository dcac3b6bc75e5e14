#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Lava Run level without a window.

mod config;
mod headless;
mod script;

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use lava_run_core::RunSummary;
use lava_run_host::{render_summary, LevelDriver, SummaryDisplay};
use lava_run_world::query;
use serde::Serialize;

use crate::{config::Settings, headless::HeadlessPhysics, script::ScriptedInput};

const DEFAULT_SCRIPT: &str = "right+action";

/// Plays a procedurally generated level against scripted input.
#[derive(Debug, Parser)]
#[command(name = "lava-run", version, about)]
struct Args {
    /// TOML settings file; flags below override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for level generation and enemy spawning.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of frames to simulate.
    #[arg(long)]
    frames: Option<u32>,
    /// Simulated frame length in milliseconds.
    #[arg(long, value_name = "MS")]
    frame_ms: Option<u64>,
    /// Print the outcome as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Held keys per frame, e.g. `right:120,right+up:10,action`.
    #[arg(default_value = DEFAULT_SCRIPT)]
    script: String,
}

/// Writes run outcomes to a text or JSON sink.
struct ConsoleDisplay<W> {
    out: W,
    json: bool,
}

impl<W: Write> ConsoleDisplay<W> {
    fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    fn show_progress(&mut self, progress: &Progress) -> Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.out, progress).context("failed to encode progress")?;
            writeln!(self.out)?;
        } else {
            writeln!(
                self.out,
                "Run still in progress after {} frames: {} lives, {} points.",
                progress.frames, progress.lives, progress.score
            )?;
        }
        Ok(())
    }
}

impl<W: Write> SummaryDisplay for ConsoleDisplay<W> {
    fn show(&mut self, summary: &RunSummary) -> Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.out, summary).context("failed to encode summary")?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{}", render_summary(summary))?;
        }
        Ok(())
    }
}

/// State reported when the frame budget runs out before the run ends.
#[derive(Debug, Serialize)]
struct Progress {
    finished: bool,
    frames: u32,
    lives: u32,
    score: u32,
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();

    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(frames) = args.frames {
        settings.frames = frames;
    }
    if let Some(frame_ms) = args.frame_ms {
        settings.frame_ms = frame_ms;
    }
    settings.validate()?;
    let input = ScriptedInput::parse(&args.script).context("invalid input script")?;

    let mut display = ConsoleDisplay::new(io::stdout().lock(), args.json);
    run(&settings, &input, &mut display)
}

fn run<W: Write>(
    settings: &Settings,
    input: &ScriptedInput,
    display: &mut ConsoleDisplay<W>,
) -> Result<()> {
    let mut physics = HeadlessPhysics::new(settings.gravity);
    let mut driver = LevelDriver::new(settings.driver_config());
    driver.init(&mut physics);
    if let Some(hazard) = query::hazard(driver.world()) {
        physics.set_floor(hazard.origin.y());
    }
    log::info!(
        "playing seed {} for up to {} frames of {} ms",
        settings.seed,
        settings.frames,
        settings.frame_ms
    );

    let frame = settings.frame();
    let mut elapsed = Duration::ZERO;
    for index in 0..settings.frames {
        elapsed += frame;
        physics.step(frame);
        if let Some(summary) = driver.update(elapsed, frame, &mut physics, &input.at(index)) {
            return display.show(&summary);
        }
    }

    let world = driver.world();
    display.show_progress(&Progress {
        finished: false,
        frames: settings.frames,
        lives: query::lives(world),
        score: query::score(world),
    })
}
