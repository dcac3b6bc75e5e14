//! TOML run settings for the headless binary.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use lava_run_host::DriverConfig;
use lava_run_system_combat as combat;
use lava_run_system_level_generation as level_generation;
use lava_run_system_spawning as spawning;
use serde::Deserialize;
use thiserror::Error;

/// Everything the binary needs to play one level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Seed shared by level generation and enemy spawning.
    pub(crate) seed: u64,
    /// Maximum number of frames to simulate.
    pub(crate) frames: u32,
    /// Simulated frame length.
    pub(crate) frame_ms: u64,
    /// Downward acceleration of dynamic bodies in units per second squared.
    pub(crate) gravity: f32,
    /// Platform pairs generated after the fixed ground sections.
    pub(crate) steps: u32,
    /// Time that must be exceeded between spawn passes.
    pub(crate) spawn_interval_ms: u64,
    /// Probability that an end platform spawns an enemy during a pass.
    pub(crate) spawn_chance: f64,
    /// Spawn candidates closer than this ahead of the player are skipped.
    pub(crate) safe_distance: f32,
    /// Minimum time between two attacks.
    pub(crate) attack_cooldown_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            frames: 3_600,
            frame_ms: 16,
            gravity: 300.0,
            steps: 10,
            spawn_interval_ms: 1_000,
            spawn_chance: 0.5,
            safe_distance: 50.0,
            attack_cooldown_ms: 750,
        }
    }
}

/// Reasons a settings file is rejected after parsing.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    /// Frames must advance the clock.
    #[error("frame_ms must be positive")]
    ZeroFrameLength,
    /// A zero interval would spawn on every frame.
    #[error("spawn_interval_ms must be positive")]
    ZeroSpawnInterval,
    /// Spawn chance is a probability.
    #[error("spawn_chance must lie within 0.0..=1.0 (received {0})")]
    SpawnChanceOutOfRange(f64),
    /// Gravity pulls downwards.
    #[error("gravity must be a positive finite number (received {0})")]
    InvalidGravity(f32),
    /// The spawn exclusion zone cannot be negative.
    #[error("safe_distance must be a non-negative finite number (received {0})")]
    InvalidSafeDistance(f32),
}

impl Settings {
    /// Reads and validates the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid settings in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).context("invalid settings toml")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the simulation cannot run with.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_ms == 0 {
            return Err(ConfigError::ZeroFrameLength);
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(ConfigError::SpawnChanceOutOfRange(self.spawn_chance));
        }
        if !self.gravity.is_finite() || self.gravity <= 0.0 {
            return Err(ConfigError::InvalidGravity(self.gravity));
        }
        if !self.safe_distance.is_finite() || self.safe_distance < 0.0 {
            return Err(ConfigError::InvalidSafeDistance(self.safe_distance));
        }
        Ok(())
    }

    /// Simulated frame length as a duration.
    pub(crate) fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Builds the driver configuration for every system.
    pub(crate) fn driver_config(&self) -> DriverConfig {
        let spawn_interval = Duration::from_millis(self.spawn_interval_ms);
        let cooldown = Duration::from_millis(self.attack_cooldown_ms);
        DriverConfig {
            generation: level_generation::Config {
                steps: self.steps,
                ..level_generation::Config::with_seed(self.seed)
            },
            spawning: spawning::Config::new(spawn_interval, self.seed)
                .with_spawn_chance(self.spawn_chance)
                .with_safe_distance(self.safe_distance),
            combat: combat::Config::new(cooldown),
        }
    }
}
