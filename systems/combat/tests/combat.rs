use std::time::Duration;

use lava_run_core::{Collidable, Command, EnemyRemoval, Event, RunPhase, WorldPoint};
use lava_run_system_combat::{Combat, Config};
use lava_run_world::{self as world, query, World};

fn run_frame(
    world: &mut World,
    combat: &mut Combat,
    dt_ms: u64,
    action_down: bool,
) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(dt_ms),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    combat.handle(&events, query::run_phase(world), action_down, &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn opened(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::CombatWindowOpened { .. }))
        .count()
}

fn closed(events: &[Event]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::CombatWindowClosed { .. }))
}

#[test]
fn attempts_closer_than_cooldown_open_one_window() {
    let mut world = World::new();
    let mut combat = Combat::new(Config::new(Duration::from_millis(750)));

    let mut windows = 0;
    windows += opened(&run_frame(&mut world, &mut combat, 800, true));
    windows += opened(&run_frame(&mut world, &mut combat, 300, true));
    windows += opened(&run_frame(&mut world, &mut combat, 300, true));

    assert_eq!(windows, 1);
}

#[test]
fn held_key_swings_once_per_cooldown() {
    let mut world = World::new();
    let mut combat = Combat::default();

    let mut windows = 0;
    for _ in 0..150 {
        windows += opened(&run_frame(&mut world, &mut combat, 10, true));
    }

    // 1500ms of held input: swings at 750ms and 1500ms.
    assert_eq!(windows, 2);
}

#[test]
fn window_closes_after_active_duration() {
    let mut world = World::new();
    let mut combat = Combat::default();

    assert_eq!(opened(&run_frame(&mut world, &mut combat, 750, true)), 1);
    assert_eq!(query::combat_windows(&world).len(), 1);
    assert!(!query::player(&world).idle_animation);

    let events = run_frame(&mut world, &mut combat, 499, false);
    assert!(!closed(&events));

    let events = run_frame(&mut world, &mut combat, 1, false);
    assert!(closed(&events));
    assert!(query::combat_windows(&world).is_empty());
    assert!(query::player(&world).idle_animation);
}

#[test]
fn one_swing_scores_each_enemy_once() {
    let mut world = World::new();
    let mut combat = Combat::default();
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::SpawnEnemy {
            position: WorldPoint::new(62.0, 500.0),
        },
        &mut events,
    );
    let enemy = query::enemy_view(&world).iter().next().expect("enemy").id;

    let _ = run_frame(&mut world, &mut combat, 750, true);
    let window = query::combat_windows(&world)[0].id;

    for _ in 0..3 {
        world::apply(
            &mut world,
            Command::ReportOverlap {
                first: Collidable::CombatWindow(window),
                second: Collidable::Enemy(enemy),
            },
            &mut events,
        );
    }

    assert_eq!(query::score(&world), lava_run_core::SCORE_PER_KILL);
    assert!(
        query::combat_windows(&world).is_empty(),
        "window closes on first hit"
    );
    let snapshot = query::enemy_view(&world).into_vec()[0];
    assert!(snapshot.hurt);

    let events = run_frame(&mut world, &mut combat, 500, false);
    assert!(events.contains(&Event::EnemyRemoved {
        enemy,
        cause: EnemyRemoval::Defeated,
    }));
    assert!(query::enemy_view(&world).is_empty());
    assert_eq!(query::run_phase(&world), RunPhase::Playing);
}
