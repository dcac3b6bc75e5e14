use std::time::Duration;

use lava_run_core::{Command, EndPlatformMarker, Event, PlatformId, RunPhase, WorldPoint};
use lava_run_system_level_generation::{Config as GeneratorConfig, LevelGenerator};
use lava_run_system_spawning::{Config, Spawning};
use lava_run_world::{self as world, query, World};

fn marker(index: u32, x: f32, y: f32) -> EndPlatformMarker {
    EndPlatformMarker {
        platform: PlatformId::new(index),
        position: WorldPoint::new(x, y),
        width: 32.0,
    }
}

fn tick(ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(ms),
    }
}

fn always() -> Spawning {
    Spawning::new(every_pass())
}

fn every_pass() -> Config {
    Config::new(Duration::from_secs(1), 0x4d59_5df4).with_spawn_chance(1.0)
}

#[test]
fn waits_until_interval_is_exceeded() {
    let markers = [marker(0, 500.0, 400.0)];
    let mut spawning = always();
    let mut commands = Vec::new();

    spawning.handle(
        &[tick(600), tick(400)],
        RunPhase::Playing,
        WorldPoint::new(0.0, 500.0),
        &markers,
        &mut commands,
    );
    assert!(commands.is_empty(), "exactly one interval must not spawn");

    spawning.handle(
        &[tick(1)],
        RunPhase::Playing,
        WorldPoint::new(0.0, 500.0),
        &markers,
        &mut commands,
    );
    assert_eq!(commands.len(), 1);

    spawning.handle(
        &[tick(16)],
        RunPhase::Playing,
        WorldPoint::new(0.0, 500.0),
        &markers,
        &mut commands,
    );
    assert_eq!(commands.len(), 1, "accumulator restarts after a pass");
}

#[test]
fn spawns_inside_left_half_of_end_tile_above_it() {
    let markers = [marker(0, 500.0, 400.0), marker(1, 900.0, 570.0)];
    let mut spawning = always();
    let mut commands = Vec::new();

    spawning.handle(
        &[tick(1500)],
        RunPhase::Playing,
        WorldPoint::new(0.0, 500.0),
        &markers,
        &mut commands,
    );

    assert_eq!(commands.len(), 2);
    for (command, marker) in commands.iter().zip(markers.iter()) {
        let Command::SpawnEnemy { position } = command else {
            panic!("unexpected command emitted: {command:?}");
        };
        assert!(position.x() >= marker.position.x() - 16.0);
        assert!(position.x() <= marker.position.x());
        assert_eq!(position.y(), marker.position.y() - 32.0);
    }
}

#[test]
fn candidates_close_ahead_of_player_are_skipped() {
    let markers = [marker(0, 500.0, 400.0)];
    let mut spawning = always();
    let mut commands = Vec::new();

    for _ in 0..20 {
        spawning.handle(
            &[tick(1001)],
            RunPhase::Playing,
            WorldPoint::new(460.0, 380.0),
            &markers,
            &mut commands,
        );
    }

    assert!(
        commands.is_empty(),
        "every candidate lies within 50 units ahead of the player"
    );
}

#[test]
fn zero_safe_distance_allows_spawns_just_ahead_of_player() {
    let markers = [marker(0, 500.0, 400.0)];
    let mut spawning = Spawning::new(every_pass().with_safe_distance(0.0));
    let mut commands = Vec::new();

    spawning.handle(
        &[tick(1001)],
        RunPhase::Playing,
        WorldPoint::new(460.0, 380.0),
        &markers,
        &mut commands,
    );

    assert_eq!(commands.len(), 1);
    let Command::SpawnEnemy { position } = &commands[0] else {
        panic!("unexpected command emitted: {:?}", commands[0]);
    };
    assert!(position.x() >= 484.0 && position.x() <= 500.0);
}

#[test]
fn zero_chance_never_spawns() {
    let markers = [marker(0, 500.0, 400.0), marker(1, 700.0, 400.0)];
    let mut spawning = Spawning::new(every_pass().with_spawn_chance(0.0));
    let mut commands = Vec::new();

    for _ in 0..10 {
        spawning.handle(
            &[tick(1001)],
            RunPhase::Playing,
            WorldPoint::new(0.0, 0.0),
            &markers,
            &mut commands,
        );
    }

    assert!(commands.is_empty());
}

#[test]
fn finished_run_resets_accumulator() {
    let markers = [marker(0, 500.0, 400.0)];
    let mut spawning = always();
    let mut commands = Vec::new();

    spawning.handle(
        &[tick(900)],
        RunPhase::Playing,
        WorldPoint::new(0.0, 0.0),
        &markers,
        &mut commands,
    );
    spawning.handle(
        &[tick(900)],
        RunPhase::Finished,
        WorldPoint::new(0.0, 0.0),
        &markers,
        &mut commands,
    );
    assert!(commands.is_empty(), "finished runs never spawn");

    spawning.handle(
        &[tick(900)],
        RunPhase::Playing,
        WorldPoint::new(0.0, 0.0),
        &markers,
        &mut commands,
    );
    assert!(commands.is_empty(), "accumulator restarted while finished");
}

#[test]
fn dying_player_does_not_stop_spawns() {
    let markers = [marker(0, 500.0, 400.0)];
    let mut spawning = always();
    let mut commands = Vec::new();

    spawning.handle(
        &[tick(1200)],
        RunPhase::Dying,
        WorldPoint::new(0.0, 0.0),
        &markers,
        &mut commands,
    );

    assert_eq!(commands.len(), 1);
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay();
    let second = replay();

    assert!(!first.is_empty(), "replay should spawn enemies");
    assert_eq!(first, second, "replay diverged between runs");
}

fn replay() -> Vec<WorldPoint> {
    let mut world = World::new();
    let mut events = Vec::new();
    let layout = LevelGenerator::new(GeneratorConfig::with_seed(21)).generate();
    world::apply(&mut world, Command::LoadLevel { layout }, &mut events);

    let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 0x1234_5678));
    let mut spawned = Vec::new();

    for _ in 0..300 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        let mut commands = Vec::new();
        spawning.handle(
            &events,
            query::run_phase(&world),
            query::player(&world).position,
            query::end_markers(&world),
            &mut commands,
        );

        for command in commands {
            let mut generated = Vec::new();
            world::apply(&mut world, command, &mut generated);
            for event in generated {
                if let Event::EnemySpawned { position, .. } = event {
                    spawned.push(position);
                }
            }
        }
    }

    assert_eq!(query::enemy_view(&world).len(), spawned.len());
    spawned
}
