use std::time::Duration;

use lava_run_core::{
    Body, Collidable, Command, EnemyId, EnemyRemoval, Event, HazardStrip, LevelLayout, Platform,
    PlatformId, PlayerAnimation, RunPhase, RunSummary, WorldPoint, STARTING_LIVES,
};
use lava_run_world::{self as world, query, World};

fn loaded_world() -> World {
    let layout = LevelLayout::new(
        vec![
            Platform::new(PlatformId::new(0), WorldPoint::new(10.0, 570.0), 10),
            Platform::new(PlatformId::new(1), WorldPoint::new(400.0, 570.0), 8),
        ],
        WorldPoint::new(616.0, 522.0),
        HazardStrip {
            origin: WorldPoint::new(-300.0, 600.0),
            segment_width: 128.0,
            segments: 16,
        },
    );
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadLevel { layout }, &mut events);
    world
}

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn spawn(world: &mut World, x: f32) -> EnemyId {
    let events = apply(
        world,
        Command::SpawnEnemy {
            position: WorldPoint::new(x, 500.0),
        },
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("enemy spawned")
}

fn collide(world: &mut World, enemy: EnemyId) -> Vec<Event> {
    apply(
        world,
        Command::ReportOverlap {
            first: Collidable::Player,
            second: Collidable::Enemy(enemy),
        },
    )
}

fn tick(world: &mut World, ms: u64) -> Vec<Event> {
    apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(ms),
        },
    )
}

fn run_ended(events: &[Event]) -> Vec<RunSummary> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::RunEnded { summary } => Some(summary.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn collision_costs_a_life_and_attack_scores() {
    let mut world = loaded_world();
    assert_eq!(query::lives(&world), 3);
    assert_eq!(query::score(&world), 0);

    let first = spawn(&mut world, 200.0);
    let second = spawn(&mut world, 300.0);

    let events = collide(&mut world, first);
    assert!(events.contains(&Event::EnemyRemoved {
        enemy: first,
        cause: EnemyRemoval::CollidedWithPlayer,
    }));
    assert_eq!(query::lives(&world), 2);
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::enemy_view(&world).len(), 1);

    let _ = apply(&mut world, Command::OpenCombatWindow);
    let window = query::combat_windows(&world)[0].id;
    let events = apply(
        &mut world,
        Command::ReportOverlap {
            first: Collidable::Enemy(second),
            second: Collidable::CombatWindow(window),
        },
    );

    assert!(events.contains(&Event::ScoreChanged { score: 20 }));
    assert_eq!(query::score(&world), 20);
    assert_eq!(query::lives(&world), 2);
}

#[test]
fn hurt_enemy_cannot_hurt_player() {
    let mut world = loaded_world();
    let enemy = spawn(&mut world, 80.0);

    let _ = apply(&mut world, Command::OpenCombatWindow);
    let window = query::combat_windows(&world)[0].id;
    let _ = apply(
        &mut world,
        Command::ReportOverlap {
            first: Collidable::CombatWindow(window),
            second: Collidable::Enemy(enemy),
        },
    );

    let events = collide(&mut world, enemy);
    assert!(events.is_empty());
    assert_eq!(query::lives(&world), STARTING_LIVES);
}

#[test]
fn losing_every_life_ends_the_run_once_after_death_delay() {
    let mut world = loaded_world();
    let _ = tick(&mut world, 2_000);

    for _ in 0..3 {
        let enemy = spawn(&mut world, 100.0);
        let _ = collide(&mut world, enemy);
    }

    assert_eq!(query::lives(&world), 0);
    assert_eq!(query::run_phase(&world), RunPhase::Dying);
    assert_eq!(query::player(&world).animation, PlayerAnimation::Death);

    let straggler = spawn(&mut world, 100.0);
    assert!(
        collide(&mut world, straggler).is_empty(),
        "dying player is untouchable"
    );
    assert_eq!(query::lives(&world), 0);

    assert!(run_ended(&tick(&mut world, 499)).is_empty());
    let summaries = run_ended(&tick(&mut world, 1));
    assert_eq!(
        summaries,
        vec![RunSummary {
            score: 0,
            time: "0 minutes and 2 seconds".to_owned(),
            did_win: false,
        }]
    );
    assert_eq!(query::run_phase(&world), RunPhase::Finished);

    let elapsed = query::elapsed(&world);
    assert!(tick(&mut world, 5_000).is_empty());
    let goal = Command::ReportOverlap {
        first: Collidable::Player,
        second: Collidable::Goal,
    };
    assert!(apply(&mut world, goal).is_empty());
    let late_spawn = Command::SpawnEnemy {
        position: WorldPoint::new(0.0, 0.0),
    };
    assert!(apply(&mut world, late_spawn).is_empty());
    assert_eq!(query::elapsed(&world), elapsed);
    let did_win = query::summary(&world).map(|summary| summary.did_win);
    assert_eq!(did_win, Some(false));
}

#[test]
fn reaching_goal_wins_regardless_of_lives() {
    let mut world = loaded_world();
    let _ = tick(&mut world, 61_500);
    let enemy = spawn(&mut world, 100.0);
    let _ = collide(&mut world, enemy);
    let enemy = spawn(&mut world, 100.0);
    let _ = collide(&mut world, enemy);
    assert_eq!(query::lives(&world), 1);

    let events = apply(
        &mut world,
        Command::ReportOverlap {
            first: Collidable::Goal,
            second: Collidable::Player,
        },
    );

    assert_eq!(
        run_ended(&events),
        vec![RunSummary {
            score: 0,
            time: "1 minutes and 1 seconds".to_owned(),
            did_win: true,
        }]
    );
    assert_eq!(query::pending_timers(&world), 0);
}

#[test]
fn falling_out_of_the_world_loses_immediately() {
    let mut world = loaded_world();
    let body = Body::Player;
    let events = apply(&mut world, Command::ReportWorldBoundsExit { body });

    let summaries = run_ended(&events);
    assert_eq!(summaries.len(), 1);
    assert!(!summaries[0].did_win);
    assert_eq!(query::lives(&world), STARTING_LIVES);
}

#[test]
fn enemies_leaving_the_world_are_removed() {
    let mut world = loaded_world();
    let enemy = spawn(&mut world, 500.0);

    let events = apply(
        &mut world,
        Command::ReportWorldBoundsExit {
            body: Body::Enemy(enemy),
        },
    );

    assert_eq!(
        events,
        vec![Event::EnemyRemoved {
            enemy,
            cause: EnemyRemoval::LeftWorld,
        }]
    );
    assert!(query::enemy_view(&world).is_empty());
    assert_eq!(query::lives(&world), STARTING_LIVES);
}

#[test]
fn each_distinct_kill_scores_twenty() {
    let mut world = loaded_world();
    let mut score = 0;

    for round in 0..4 {
        let enemy = spawn(&mut world, 70.0 + round as f32);
        let _ = apply(&mut world, Command::OpenCombatWindow);
        let window = query::combat_windows(&world)[0].id;
        for _ in 0..2 {
            let _ = apply(
                &mut world,
                Command::ReportOverlap {
                    first: Collidable::CombatWindow(window),
                    second: Collidable::Enemy(enemy),
                },
            );
        }
        score += 20;
        assert_eq!(query::score(&world), score);
        let _ = tick(&mut world, 500);
    }

    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn synced_positions_feed_window_placement() {
    let mut world = loaded_world();
    let _ = apply(
        &mut world,
        Command::SyncPlayerPosition {
            position: WorldPoint::new(250.0, 538.0),
        },
    );

    let events = apply(&mut world, Command::OpenCombatWindow);

    assert!(events.contains(&Event::CombatWindowOpened {
        window: query::combat_windows(&world)[0].id,
        position: WorldPoint::new(282.0, 538.0),
        size: 32.0,
    }));
    assert_eq!(query::player(&world).animation, PlayerAnimation::Attack);
}
