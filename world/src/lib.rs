#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for Lava Run.

mod timers;

use std::time::Duration;

use lava_run_core::{
    Body, Collidable, CombatWindowId, Command, EndPlatformMarker, EnemyId, EnemyRemoval, Event,
    Facing, LevelLayout, PlayerAnimation, RunPhase, RunSummary, WorldPoint, BODY_BOUNCE,
    COMBAT_WINDOW_DURATION, COMBAT_WINDOW_OFFSET, COMBAT_WINDOW_SIZE, DEATH_DELAY,
    ENEMY_REMOVAL_DELAY, ENEMY_VELOCITY_X, HURT_RECOVERY, PLAYER_JUMP_VELOCITY, PLAYER_RUN_SPEED,
    PLAYER_START, SCORE_PER_KILL, STARTING_LIVES,
};

use self::timers::{TimerAction, TimerQueue};

/// Represents the authoritative state of a single level instance.
#[derive(Debug)]
pub struct World {
    layout: Option<LevelLayout>,
    end_markers: Vec<EndPlatformMarker>,
    player: Player,
    enemies: Vec<Enemy>,
    windows: Vec<CombatWindow>,
    run: RunState,
    timers: TimerQueue,
    next_enemy_id: u32,
    next_window_id: u32,
}

impl World {
    /// Creates an empty world with a fresh run and no level loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layout: None,
            end_markers: Vec::new(),
            player: Player::new(),
            enemies: Vec::new(),
            windows: Vec::new(),
            run: RunState::new(),
            timers: TimerQueue::default(),
            next_enemy_id: 0,
            next_window_id: 0,
        }
    }

    fn load(&mut self, layout: LevelLayout, out_events: &mut Vec<Event>) {
        *self = Self::new();
        self.end_markers = layout.end_markers();
        log::info!(
            "level loaded with {} platforms, goal at ({}, {})",
            layout.platforms().len(),
            layout.goal().x(),
            layout.goal().y()
        );
        out_events.push(Event::LevelLoaded {
            platforms: layout.platforms().len(),
            goal: layout.goal(),
        });
        self.layout = Some(layout);
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.run.elapsed = self.run.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        while let Some(action) = self.timers.pop_due(self.run.elapsed) {
            log::trace!("timer fired at {:?}: {action:?}", self.run.elapsed);
            self.fire(action, out_events);
            if self.run.phase == RunPhase::Finished {
                break;
            }
        }
    }

    fn fire(&mut self, action: TimerAction, out_events: &mut Vec<Event>) {
        match action {
            TimerAction::CloseCombatWindow(window) => self.close_window(window, out_events),
            TimerAction::ResumeIdleAnimation => {
                if self.run.phase == RunPhase::Playing {
                    self.player.idle_animation = true;
                }
            }
            TimerAction::RemoveDefeatedEnemy(enemy) => {
                self.remove_enemy(enemy, EnemyRemoval::Defeated, out_events);
            }
            TimerAction::EndRunAsLoss => self.finish(false, out_events),
        }
    }

    fn schedule_in(&mut self, delay: Duration, action: TimerAction) {
        let fire_at = self.run.elapsed.saturating_add(delay);
        self.timers.schedule(fire_at, action);
    }

    fn move_player(&mut self, intent: Option<Facing>, out_events: &mut Vec<Event>) {
        if self.run.phase != RunPhase::Playing {
            return;
        }

        if let Some(facing) = intent {
            self.player.facing = facing;
        }
        self.player.velocity_x = intent.map_or(0.0, |facing| facing.sign() * PLAYER_RUN_SPEED);
        out_events.push(Event::PlayerVelocitySet {
            velocity_x: self.player.velocity_x,
        });

        if self.player.idle_animation {
            let animation = match intent {
                Some(Facing::Left) => PlayerAnimation::WalkLeft,
                Some(Facing::Right) => PlayerAnimation::WalkRight,
                None => PlayerAnimation::Idle,
            };
            self.set_animation(animation, out_events);
        }
    }

    fn set_animation(&mut self, animation: PlayerAnimation, out_events: &mut Vec<Event>) {
        if self.player.animation == animation {
            return;
        }
        self.player.animation = animation;
        out_events.push(Event::PlayerAnimationChanged { animation });
    }

    fn spawn_enemy(&mut self, position: WorldPoint, out_events: &mut Vec<Event>) {
        let enemy = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        self.enemies.push(Enemy {
            id: enemy,
            position,
            velocity_x: ENEMY_VELOCITY_X,
            hurt: false,
        });
        log::debug!(
            "enemy {} spawned at ({}, {})",
            enemy.get(),
            position.x(),
            position.y()
        );
        out_events.push(Event::EnemySpawned {
            enemy,
            position,
            velocity_x: ENEMY_VELOCITY_X,
            bounce: BODY_BOUNCE,
        });
    }

    fn remove_enemy(&mut self, enemy: EnemyId, cause: EnemyRemoval, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };
        let _ = self.enemies.remove(index);
        log::debug!("enemy {} removed: {cause:?}", enemy.get());
        out_events.push(Event::EnemyRemoved { enemy, cause });
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies
            .iter()
            .position(|candidate| candidate.id == enemy)
    }

    fn open_window(&mut self, out_events: &mut Vec<Event>) {
        if self.run.phase != RunPhase::Playing {
            return;
        }

        let window = CombatWindowId::new(self.next_window_id);
        self.next_window_id = self.next_window_id.wrapping_add(1);
        let reach = self.player.facing.sign() * COMBAT_WINDOW_OFFSET;
        let position = self.player.position.offset(reach, 0.0);
        self.windows.push(CombatWindow {
            id: window,
            position,
        });
        out_events.push(Event::CombatWindowOpened {
            window,
            position,
            size: COMBAT_WINDOW_SIZE,
        });

        self.player.idle_animation = false;
        self.set_animation(PlayerAnimation::Attack, out_events);
        let close = TimerAction::CloseCombatWindow(window);
        self.schedule_in(COMBAT_WINDOW_DURATION, close);
        self.schedule_in(COMBAT_WINDOW_DURATION, TimerAction::ResumeIdleAnimation);
    }

    fn close_window(&mut self, window: CombatWindowId, out_events: &mut Vec<Event>) {
        let Some(index) = self.windows.iter().position(|open| open.id == window) else {
            return;
        };
        let _ = self.windows.remove(index);
        out_events.push(Event::CombatWindowClosed { window });
    }

    fn resolve_overlap(
        &mut self,
        first: Collidable,
        second: Collidable,
        out_events: &mut Vec<Event>,
    ) {
        match Contact::classify(first, second) {
            Contact::PlayerEnemy(enemy) => self.enemy_struck_player(enemy, out_events),
            Contact::WindowEnemy(window, enemy) => {
                self.window_struck_enemy(window, enemy, out_events)
            }
            Contact::PlayerGoal => {
                if self.run.phase == RunPhase::Playing {
                    self.finish(true, out_events);
                }
            }
            Contact::Ignored => {}
        }
    }

    fn enemy_struck_player(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        if self.run.phase != RunPhase::Playing {
            return;
        }
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };
        if self.enemies[index].hurt {
            return;
        }

        self.remove_enemy(enemy, EnemyRemoval::CollidedWithPlayer, out_events);
        self.run.lives = self.run.lives.saturating_sub(1);
        out_events.push(Event::LivesChanged {
            lives: self.run.lives,
        });
        self.player.idle_animation = false;
        self.set_animation(PlayerAnimation::Hurt, out_events);

        if self.run.lives == 0 {
            log::debug!("last life lost at {:?}", self.run.elapsed);
            self.run.phase = RunPhase::Dying;
            self.player.velocity_x = 0.0;
            self.set_animation(PlayerAnimation::Death, out_events);
            out_events.push(Event::PlayerDisabled);
            self.schedule_in(DEATH_DELAY, TimerAction::EndRunAsLoss);
        } else {
            self.schedule_in(HURT_RECOVERY, TimerAction::ResumeIdleAnimation);
        }
    }

    fn window_struck_enemy(
        &mut self,
        window: CombatWindowId,
        enemy: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        if !self.windows.iter().any(|open| open.id == window) {
            return;
        }
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };
        let target = &mut self.enemies[index];
        if target.hurt {
            return;
        }
        target.hurt = true;
        target.velocity_x = 0.0;

        self.run.score = self.run.score.saturating_add(SCORE_PER_KILL);
        log::debug!(
            "window {} hit enemy {}, score {}",
            window.get(),
            enemy.get(),
            self.run.score
        );
        out_events.push(Event::EnemyHit { enemy, window });
        out_events.push(Event::ScoreChanged {
            score: self.run.score,
        });
        self.close_window(window, out_events);
        self.schedule_in(ENEMY_REMOVAL_DELAY, TimerAction::RemoveDefeatedEnemy(enemy));
    }

    fn left_world(&mut self, body: Body, out_events: &mut Vec<Event>) {
        match body {
            Body::Player => self.finish(false, out_events),
            Body::Enemy(enemy) => self.remove_enemy(enemy, EnemyRemoval::LeftWorld, out_events),
        }
    }

    fn finish(&mut self, did_win: bool, out_events: &mut Vec<Event>) {
        if self.run.phase == RunPhase::Finished {
            return;
        }
        self.run.phase = RunPhase::Finished;
        self.timers.clear();
        let summary = RunSummary::new(self.run.score, self.run.elapsed, did_win);
        log::info!(
            "run ended ({}): score {}, {}",
            if did_win { "won" } else { "lost" },
            summary.score,
            summary.time
        );
        self.run.summary = Some(summary.clone());
        out_events.push(Event::RunEnded { summary });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Loading a level always starts a new run. Every other command is ignored once
/// the current run has finished.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Command::LoadLevel { layout } = command {
        world.load(layout, out_events);
        return;
    }

    if world.run.phase == RunPhase::Finished {
        log::trace!("ignoring {command:?} after the run finished");
        return;
    }

    match command {
        Command::LoadLevel { .. } => {}
        Command::Tick { dt } => world.advance_clock(dt, out_events),
        Command::MovePlayer { intent } => world.move_player(intent, out_events),
        Command::JumpPlayer => {
            if world.run.phase == RunPhase::Playing {
                out_events.push(Event::PlayerJumped {
                    velocity_y: PLAYER_JUMP_VELOCITY,
                });
            }
        }
        Command::SyncPlayerPosition { position } => world.player.position = position,
        Command::SyncEnemyPosition { enemy, position } => {
            if let Some(index) = world.enemy_index(enemy) {
                world.enemies[index].position = position;
            }
        }
        Command::SpawnEnemy { position } => world.spawn_enemy(position, out_events),
        Command::OpenCombatWindow => world.open_window(out_events),
        Command::ReportOverlap { first, second } => {
            world.resolve_overlap(first, second, out_events);
        }
        Command::ReportWorldBoundsExit { body } => world.left_world(body, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use lava_run_core::{
        CombatWindowId, EndPlatformMarker, EnemyId, HazardStrip, Platform, PlayerAnimation,
        RunPhase, RunSummary, WorldPoint, COMBAT_WINDOW_SIZE,
    };

    /// Platforms of the loaded level in generation order.
    #[must_use]
    pub fn platforms(world: &World) -> &[Platform] {
        match &world.layout {
            Some(layout) => layout.platforms(),
            None => &[],
        }
    }

    /// End-platform markers in generation order.
    #[must_use]
    pub fn end_markers(world: &World) -> &[EndPlatformMarker] {
        &world.end_markers
    }

    /// Location of the goal marker, if a level is loaded.
    #[must_use]
    pub fn goal(world: &World) -> Option<WorldPoint> {
        world.layout.as_ref().map(|layout| layout.goal())
    }

    /// Lava strip of the loaded level.
    #[must_use]
    pub fn hazard(world: &World) -> Option<HazardStrip> {
        world.layout.as_ref().map(|layout| layout.hazard())
    }

    /// Current lifecycle phase of the run.
    #[must_use]
    pub fn run_phase(world: &World) -> RunPhase {
        world.run.phase
    }

    /// Lives the player has left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.run.lives
    }

    /// Score accumulated during the run.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.run.score
    }

    /// Simulated time elapsed since the level loaded.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.run.elapsed
    }

    /// Terminal record of the run once it finished.
    #[must_use]
    pub fn summary(world: &World) -> Option<&RunSummary> {
        world.run.summary.as_ref()
    }

    /// Number of deferred actions waiting to fire.
    #[must_use]
    pub fn pending_timers(world: &World) -> usize {
        world.timers.len()
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            facing: world.player.facing,
            velocity_x: world.player.velocity_x,
            animation: world.player.animation,
            idle_animation: world.player.idle_animation,
        }
    }

    /// Captures a read-only view of the enemies inhabiting the level.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                velocity_x: enemy.velocity_x,
                hurt: enemy.hurt,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Combat windows that are currently open.
    #[must_use]
    pub fn combat_windows(world: &World) -> Vec<CombatWindowSnapshot> {
        world
            .windows
            .iter()
            .map(|window| CombatWindowSnapshot {
                id: window.id,
                position: window.position,
                size: COMBAT_WINDOW_SIZE,
            })
            .collect()
    }

    /// Immutable representation of the player's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Last position mirrored from the host.
        pub position: WorldPoint,
        /// Direction the player faces.
        pub facing: lava_run_core::Facing,
        /// Horizontal velocity requested from the host.
        pub velocity_x: f32,
        /// Animation currently playing.
        pub animation: PlayerAnimation,
        /// Whether movement input may switch the animation.
        pub idle_animation: bool,
    }

    /// Read-only snapshot describing all enemies within the level.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of enemies captured by the view.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the view contains no enemies.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier assigned to the enemy.
        pub id: EnemyId,
        /// Last position mirrored from the host.
        pub position: WorldPoint,
        /// Horizontal velocity of the enemy body.
        pub velocity_x: f32,
        /// Whether the enemy was struck and awaits removal.
        pub hurt: bool,
    }

    /// Immutable representation of an open combat window.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CombatWindowSnapshot {
        /// Identifier assigned to the window.
        pub id: CombatWindowId,
        /// Centre of the hitbox.
        pub position: WorldPoint,
        /// Side length of the square hitbox.
        pub size: f32,
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: WorldPoint,
    facing: Facing,
    velocity_x: f32,
    animation: PlayerAnimation,
    idle_animation: bool,
}

impl Player {
    fn new() -> Self {
        Self {
            position: PLAYER_START,
            facing: Facing::Right,
            velocity_x: 0.0,
            animation: PlayerAnimation::Idle,
            idle_animation: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    id: EnemyId,
    position: WorldPoint,
    velocity_x: f32,
    hurt: bool,
}

#[derive(Clone, Copy, Debug)]
struct CombatWindow {
    id: CombatWindowId,
    position: WorldPoint,
}

#[derive(Clone, Debug)]
struct RunState {
    lives: u32,
    score: u32,
    elapsed: Duration,
    phase: RunPhase,
    summary: Option<RunSummary>,
}

impl RunState {
    fn new() -> Self {
        Self {
            lives: STARTING_LIVES,
            score: 0,
            elapsed: Duration::ZERO,
            phase: RunPhase::Playing,
            summary: None,
        }
    }
}

/// Overlap pair resolved to the interaction it represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Contact {
    PlayerEnemy(EnemyId),
    WindowEnemy(CombatWindowId, EnemyId),
    PlayerGoal,
    Ignored,
}

impl Contact {
    fn classify(first: Collidable, second: Collidable) -> Self {
        match (first, second) {
            (Collidable::Player, Collidable::Enemy(enemy))
            | (Collidable::Enemy(enemy), Collidable::Player) => Self::PlayerEnemy(enemy),
            (Collidable::CombatWindow(window), Collidable::Enemy(enemy))
            | (Collidable::Enemy(enemy), Collidable::CombatWindow(window)) => {
                Self::WindowEnemy(window, enemy)
            }
            (Collidable::Player, Collidable::Goal) | (Collidable::Goal, Collidable::Player) => {
                Self::PlayerGoal
            }
            _ => Self::Ignored,
        }
    }
}
