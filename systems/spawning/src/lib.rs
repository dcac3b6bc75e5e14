#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use lava_run_core::{Command, EndPlatformMarker, Event, RunPhase, WorldPoint};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_SPAWN_CHANCE: f64 = 0.5;
const DEFAULT_SAFE_DISTANCE: f32 = 50.0;
const SPAWN_LIFT: f32 = 32.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    spawn_chance: f64,
    safe_distance: f32,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            spawn_chance: DEFAULT_SPAWN_CHANCE,
            safe_distance: DEFAULT_SAFE_DISTANCE,
        }
    }

    /// Overrides the probability that a marker spawns an enemy during a pass.
    ///
    /// The value is clamped to `0.0..=1.0`; NaN disables spawning.
    #[must_use]
    pub fn with_spawn_chance(mut self, spawn_chance: f64) -> Self {
        self.spawn_chance = if spawn_chance.is_nan() {
            0.0
        } else {
            spawn_chance.clamp(0.0, 1.0)
        };
        self
    }

    /// Overrides the distance ahead of the player inside which spawns are skipped.
    #[must_use]
    pub fn with_safe_distance(mut self, safe_distance: f32) -> Self {
        self.safe_distance = safe_distance;
        self
    }

    /// Time that must be exceeded between spawn passes.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Distance ahead of the player inside which spawns are skipped.
    #[must_use]
    pub const fn safe_distance(&self) -> f32 {
        self.safe_distance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_INTERVAL, 0)
    }
}

/// Pure system that periodically proposes enemies at platform ends.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
    spawn_chance: f64,
    safe_distance: f32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            spawn_chance: config.spawn_chance,
            safe_distance: config.safe_distance,
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// Once the accumulated time exceeds the spawn interval, every marker gets
    /// one spawn roll and the accumulator restarts from zero.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RunPhase,
        player: WorldPoint,
        markers: &[EndPlatformMarker],
        out: &mut Vec<Command>,
    ) {
        if phase == RunPhase::Finished {
            self.accumulator = Duration::ZERO;
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator <= self.spawn_interval {
            return;
        }
        self.accumulator = Duration::ZERO;

        let before = out.len();
        for marker in markers {
            if let Some(position) = self.roll(marker, player) {
                out.push(Command::SpawnEnemy { position });
            }
        }
        log::trace!(
            "spawn pass over {} markers proposed {} enemies",
            markers.len(),
            out.len() - before
        );
    }

    fn roll(&mut self, marker: &EndPlatformMarker, player: WorldPoint) -> Option<WorldPoint> {
        if !self.rng.gen_bool(self.spawn_chance) {
            return None;
        }

        let right = marker.position.x();
        let left = right - marker.width / 2.0;
        let x = if left < right {
            self.rng.gen_range(left..=right)
        } else {
            right
        };

        if x < player.x() + self.safe_distance {
            return None;
        }

        Some(WorldPoint::new(x, marker.position.y() - SPAWN_LIFT))
    }
}
