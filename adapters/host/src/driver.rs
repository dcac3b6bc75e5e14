use std::time::Duration;

use glam::Vec2;
use lava_run_core::{
    Collidable, Command, Event, Platform, RunSummary, BODY_BOUNCE, BODY_SIZE, PLAYER_START,
    TILE_SIZE,
};
use lava_run_system_combat::{self as combat, Combat};
use lava_run_system_level_generation::{self as level_generation, LevelGenerator};
use lava_run_system_player_control::{ControlInput, PlayerControl};
use lava_run_system_spawning::{self as spawning, Spawning};
use lava_run_world::{self as world, query, World};

use crate::{to_world_point, BodyKind, BodySpec, Contact, InputSource, Key, PhysicsHost};

/// Tuning for every system the driver owns.
#[derive(Clone, Debug, Default)]
pub struct DriverConfig {
    /// Level layout tuning and seed.
    pub generation: level_generation::Config,
    /// Enemy spawn cadence, chance and seed.
    pub spawning: spawning::Config,
    /// Attack cooldown.
    pub combat: combat::Config,
}

/// Runs one level: owns the world and the systems and talks to the host.
#[derive(Debug)]
pub struct LevelDriver {
    world: World,
    generator: LevelGenerator,
    spawning: Spawning,
    combat: Combat,
    player_control: PlayerControl,
    events: Vec<Event>,
    commands: Vec<Command>,
    contacts: Vec<Contact>,
    reported: bool,
}

impl LevelDriver {
    /// Creates a driver whose systems are built from the provided config.
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self {
            world: World::new(),
            generator: LevelGenerator::new(config.generation),
            spawning: Spawning::new(config.spawning),
            combat: Combat::new(config.combat),
            player_control: PlayerControl,
            events: Vec::new(),
            commands: Vec::new(),
            contacts: Vec::new(),
            reported: false,
        }
    }

    /// Read-only access to the level state, for HUDs and diagnostics.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether the run's summary has already been handed out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.reported
    }

    /// Generates the level, loads it into the world and creates its bodies.
    pub fn init(&mut self, physics: &mut dyn PhysicsHost) {
        let layout = self.generator.generate();
        self.events.clear();
        self.reported = false;
        world::apply(
            &mut self.world,
            Command::LoadLevel { layout },
            &mut self.events,
        );

        for platform in query::platforms(&self.world) {
            physics.create_body(platform_body(platform));
        }
        if let Some(goal) = query::goal(&self.world) {
            physics.create_body(BodySpec::new(
                Collidable::Goal,
                BodyKind::Sensor,
                goal,
                Vec2::splat(TILE_SIZE),
            ));
        }
        physics.create_body(BodySpec::new(
            Collidable::Player,
            BodyKind::Dynamic,
            PLAYER_START,
            Vec2::splat(BODY_SIZE),
        ));
        physics.set_bounce(Collidable::Player, BODY_BOUNCE);
    }

    /// Advances the level by one frame.
    ///
    /// Returns the run summary on the frame the run ends and `None` on every
    /// other frame, including all frames after the summary was returned. The
    /// player and every remaining enemy body are destroyed when the run ends.
    pub fn update(
        &mut self,
        elapsed_total: Duration,
        delta: Duration,
        physics: &mut dyn PhysicsHost,
        input: &dyn InputSource,
    ) -> Option<RunSummary> {
        if self.reported {
            return None;
        }
        log::trace!("frame at {elapsed_total:?} (+{delta:?})");

        self.events.clear();
        let tick = Command::Tick { dt: delta };
        world::apply(&mut self.world, tick, &mut self.events);
        self.sync_positions(physics);
        self.report_contacts(physics);
        self.run_systems(physics, input);

        self.apply_events(physics)
    }

    fn sync_positions(&mut self, physics: &dyn PhysicsHost) {
        if let Some(position) = physics.position(Collidable::Player) {
            world::apply(
                &mut self.world,
                Command::SyncPlayerPosition {
                    position: to_world_point(position),
                },
                &mut self.events,
            );
        }

        for enemy in query::enemy_view(&self.world).into_vec() {
            if let Some(position) = physics.position(Collidable::Enemy(enemy.id)) {
                world::apply(
                    &mut self.world,
                    Command::SyncEnemyPosition {
                        enemy: enemy.id,
                        position: to_world_point(position),
                    },
                    &mut self.events,
                );
            }
        }
    }

    fn report_contacts(&mut self, physics: &mut dyn PhysicsHost) {
        self.contacts.clear();
        physics.drain_contacts(&mut self.contacts);

        for contact in self.contacts.drain(..) {
            let command = match contact {
                Contact::Overlap(first, second) => Command::ReportOverlap { first, second },
                Contact::WorldBoundsExit(body) => Command::ReportWorldBoundsExit { body },
            };
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn run_systems(&mut self, physics: &dyn PhysicsHost, input: &dyn InputSource) {
        let phase = query::run_phase(&self.world);
        let player = query::player(&self.world).position;

        self.commands.clear();
        self.spawning.handle(
            &self.events,
            phase,
            player,
            query::end_markers(&self.world),
            &mut self.commands,
        );
        self.player_control.handle(
            phase,
            ControlInput {
                left: input.is_down(Key::Left),
                right: input.is_down(Key::Right),
                up: input.is_down(Key::Up),
            },
            physics.is_grounded(Collidable::Player),
            &mut self.commands,
        );
        self.combat.handle(
            &self.events,
            phase,
            input.is_down(Key::Action),
            &mut self.commands,
        );

        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn apply_events(&mut self, physics: &mut dyn PhysicsHost) -> Option<RunSummary> {
        let mut summary = None;

        for event in &self.events {
            match event {
                Event::EnemySpawned {
                    enemy,
                    position,
                    velocity_x,
                    bounce,
                } => {
                    let body = Collidable::Enemy(*enemy);
                    physics.create_body(BodySpec::new(
                        body,
                        BodyKind::Dynamic,
                        *position,
                        Vec2::splat(BODY_SIZE),
                    ));
                    physics.set_velocity_x(body, *velocity_x);
                    physics.set_bounce(body, *bounce);
                }
                Event::EnemyHit { enemy, .. } => {
                    let body = Collidable::Enemy(*enemy);
                    physics.set_velocity_x(body, 0.0);
                    physics.set_enabled(body, false);
                }
                Event::EnemyRemoved { enemy, .. } => {
                    physics.destroy_body(Collidable::Enemy(*enemy));
                }
                Event::CombatWindowOpened {
                    window,
                    position,
                    size,
                } => physics.create_body(BodySpec::new(
                    Collidable::CombatWindow(*window),
                    BodyKind::Sensor,
                    *position,
                    Vec2::splat(*size),
                )),
                Event::CombatWindowClosed { window } => {
                    physics.destroy_body(Collidable::CombatWindow(*window));
                }
                Event::PlayerVelocitySet { velocity_x } => {
                    physics.set_velocity_x(Collidable::Player, *velocity_x);
                }
                Event::PlayerJumped { velocity_y } => {
                    physics.set_velocity_y(Collidable::Player, *velocity_y);
                }
                Event::PlayerDisabled => {
                    physics.set_velocity_x(Collidable::Player, 0.0);
                    physics.set_enabled(Collidable::Player, false);
                }
                Event::RunEnded { summary: ended } => {
                    physics.destroy_body(Collidable::Player);
                    for enemy in query::enemy_view(&self.world).iter() {
                        physics.destroy_body(Collidable::Enemy(enemy.id));
                    }
                    summary = Some(ended.clone());
                }
                Event::LevelLoaded { .. }
                | Event::TimeAdvanced { .. }
                | Event::PlayerAnimationChanged { .. }
                | Event::LivesChanged { .. }
                | Event::ScoreChanged { .. } => {}
            }
        }

        if summary.is_some() {
            self.reported = true;
        }
        summary
    }
}

fn platform_body(platform: &Platform) -> BodySpec {
    let width = platform.width();
    let centre = platform.origin().offset((width - TILE_SIZE) / 2.0, 0.0);
    BodySpec::new(
        Collidable::Platform(platform.id()),
        BodyKind::Static,
        centre,
        Vec2::new(width, TILE_SIZE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lava_run_core::{PlatformId, WorldPoint};

    #[test]
    fn platform_body_spans_every_tile() {
        let platform = Platform::new(PlatformId::new(2), WorldPoint::new(10.0, 570.0), 10);
        let spec = platform_body(&platform);

        assert_eq!(spec.kind, BodyKind::Static);
        assert_eq!(spec.size, Vec2::new(320.0, 32.0));
        assert_eq!(spec.position, Vec2::new(154.0, 570.0));
        let right_edge = spec.position.x + spec.size.x / 2.0;
        assert_eq!(right_edge, platform.end_tile().x() + 16.0);
    }
}
