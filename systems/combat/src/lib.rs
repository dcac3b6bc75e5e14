#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that gates the player's melee action behind a cooldown.

use std::time::Duration;

use lava_run_core::{Command, Event, RunPhase};

const DEFAULT_COOLDOWN: Duration = Duration::from_millis(750);

/// Configuration parameters required to construct the combat system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    cooldown: Duration,
}

impl Config {
    /// Creates a configuration with the provided attack cooldown.
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Minimum time between two combat windows.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

/// Combat system that queues a combat window when the action key is held
/// and the cooldown elapsed.
#[derive(Debug)]
pub struct Combat {
    cooldown: Duration,
    since_last_attack: Duration,
}

impl Combat {
    /// Creates a new combat system. The cooldown starts out running, so the
    /// first swing becomes available once a full cooldown of time has passed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cooldown: config.cooldown,
            since_last_attack: Duration::ZERO,
        }
    }

    /// Time left until the next swing is allowed.
    #[must_use]
    pub fn ready_in(&self) -> Duration {
        self.cooldown.saturating_sub(self.since_last_attack)
    }

    /// Emits `Command::OpenCombatWindow` when the player may swing.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RunPhase,
        action_down: bool,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.since_last_attack = self.since_last_attack.saturating_add(*dt);
            }
        }

        if phase != RunPhase::Playing || !action_down {
            return;
        }

        if self.since_last_attack < self.cooldown {
            return;
        }

        log::debug!("attack after {:?}", self.since_last_attack);
        self.since_last_attack = Duration::ZERO;
        out.push(Command::OpenCombatWindow);
    }
}

impl Default for Combat {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
