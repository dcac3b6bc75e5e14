#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lava Run level.
//!
//! This crate defines the message surface that connects the host adapter, the
//! authoritative world, and pure systems. The host and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and the host to react to deterministically.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Edge length of a single square platform tile measured in world units.
pub const TILE_SIZE: f32 = 32.0;

/// Lives granted to the player at the start of a run.
pub const STARTING_LIVES: u32 = 3;

/// Score awarded for each enemy destroyed by a combat window.
pub const SCORE_PER_KILL: u32 = 20;

/// Location where the player body is created when the level loads.
pub const PLAYER_START: WorldPoint = WorldPoint::new(30.0, 500.0);

/// Side length of the square player and enemy collision bodies.
pub const BODY_SIZE: f32 = 32.0;

/// Horizontal speed applied while a movement key is held.
pub const PLAYER_RUN_SPEED: f32 = 160.0;

/// Vertical velocity applied when the player jumps. Negative points upward.
pub const PLAYER_JUMP_VELOCITY: f32 = -330.0;

/// Bounce coefficient applied to the player and enemy bodies.
pub const BODY_BOUNCE: f32 = 0.1;

/// Constant horizontal velocity of a freshly spawned enemy.
pub const ENEMY_VELOCITY_X: f32 = -100.0;

/// Side length of the square combat window hitbox.
pub const COMBAT_WINDOW_SIZE: f32 = 32.0;

/// Horizontal distance between the player and the centre of a combat window.
pub const COMBAT_WINDOW_OFFSET: f32 = 32.0;

/// Time a combat window stays open when it does not hit anything.
pub const COMBAT_WINDOW_DURATION: Duration = Duration::from_millis(500);

/// Time the idle animation stays suspended after the player gets hurt.
pub const HURT_RECOVERY: Duration = Duration::from_millis(500);

/// Time between losing the last life and the end of the run.
pub const DEATH_DELAY: Duration = Duration::from_millis(500);

/// Time a hit enemy lingers in its hurt state before it is removed.
pub const ENEMY_REMOVAL_DELAY: Duration = Duration::from_millis(500);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the world contents with a freshly generated level.
    LoadLevel {
        /// Layout produced by the level generator.
        layout: LevelLayout,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Applies the player's horizontal movement intent for this frame.
    MovePlayer {
        /// Direction the player wants to run in, or `None` to stand still.
        intent: Option<Facing>,
    },
    /// Requests a jump. Adapters only issue this while the player is grounded.
    JumpPlayer,
    /// Mirrors the host's authoritative player body position into the world.
    SyncPlayerPosition {
        /// Centre of the player body reported by the host.
        position: WorldPoint,
    },
    /// Mirrors the host's authoritative enemy body position into the world.
    SyncEnemyPosition {
        /// Enemy whose body moved.
        enemy: EnemyId,
        /// Centre of the enemy body reported by the host.
        position: WorldPoint,
    },
    /// Requests that an enemy appear at the provided location.
    SpawnEnemy {
        /// Centre of the new enemy body.
        position: WorldPoint,
    },
    /// Requests a melee swing in front of the player.
    OpenCombatWindow,
    /// Reports that the host detected two bodies overlapping.
    ReportOverlap {
        /// First body participating in the overlap.
        first: Collidable,
        /// Second body participating in the overlap.
        second: Collidable,
    },
    /// Reports that a body crossed the world's lower bound.
    ReportWorldBoundsExit {
        /// Body that left the world.
        body: Body,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a level layout was loaded and the run started.
    LevelLoaded {
        /// Number of platforms contained in the level.
        platforms: usize,
        /// Location of the goal marker.
        goal: WorldPoint,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Sets the horizontal velocity of the player body for this frame.
    PlayerVelocitySet {
        /// Horizontal velocity in world units per second.
        velocity_x: f32,
    },
    /// Announces that the player jumped.
    PlayerJumped {
        /// Vertical velocity in world units per second.
        velocity_y: f32,
    },
    /// Announces that the player switched to a different animation.
    PlayerAnimationChanged {
        /// Animation that should now be playing.
        animation: PlayerAnimation,
    },
    /// Announces that the player's body no longer takes part in the simulation.
    PlayerDisabled,
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Centre of the enemy body.
        position: WorldPoint,
        /// Horizontal velocity of the enemy body.
        velocity_x: f32,
        /// Bounce coefficient of the enemy body.
        bounce: f32,
    },
    /// Announces that a combat window struck an enemy.
    EnemyHit {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Window that delivered the hit.
        window: CombatWindowId,
    },
    /// Confirms that an enemy left the level.
    EnemyRemoved {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Reason the enemy was removed.
        cause: EnemyRemoval,
    },
    /// Confirms that a combat window opened.
    CombatWindowOpened {
        /// Identifier assigned to the window.
        window: CombatWindowId,
        /// Centre of the window hitbox.
        position: WorldPoint,
        /// Side length of the square hitbox.
        size: f32,
    },
    /// Confirms that a combat window closed.
    CombatWindowClosed {
        /// Window that closed.
        window: CombatWindowId,
    },
    /// Reports the player's remaining lives after a change.
    LivesChanged {
        /// Lives left.
        lives: u32,
    },
    /// Reports the player's score after a change.
    ScoreChanged {
        /// Accumulated score.
        score: u32,
    },
    /// Announces that the run reached its terminal state.
    RunEnded {
        /// Record handed to the summary display.
        summary: RunSummary,
    },
}

/// Reasons an enemy may leave the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyRemoval {
    /// The enemy collided with the player.
    CollidedWithPlayer,
    /// The enemy was struck by a combat window and its hurt state elapsed.
    Defeated,
    /// The enemy crossed the world's lower bound.
    LeftWorld,
}

/// Lifecycle of a single run through the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// The player is alive and controllable.
    Playing,
    /// The player lost the last life and the death animation is playing.
    Dying,
    /// The run ended; no further state changes happen.
    Finished,
}

/// Horizontal direction the player faces or runs towards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing decreasing x.
    Left,
    /// Facing increasing x.
    #[default]
    Right,
}

impl Facing {
    /// Sign applied to horizontal offsets and velocities.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Animations the player sprite can play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAnimation {
    /// Standing still.
    #[default]
    Idle,
    /// Running towards decreasing x.
    WalkLeft,
    /// Running towards increasing x.
    WalkRight,
    /// Swinging at enemies.
    Attack,
    /// Recoiling after an enemy collision.
    Hurt,
    /// Dying after the last life was lost.
    Death,
}

/// Tagged union of every body kind that can take part in an overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collidable {
    /// The player body.
    Player,
    /// An enemy body.
    Enemy(EnemyId),
    /// An active combat window hitbox.
    CombatWindow(CombatWindowId),
    /// A static platform tile.
    Platform(PlatformId),
    /// The goal marker.
    Goal,
}

/// Dynamic bodies whose departure from the world the host reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Body {
    /// The player body.
    Player,
    /// An enemy body.
    Enemy(EnemyId),
}

impl From<Body> for Collidable {
    fn from(body: Body) -> Self {
        match body {
            Body::Player => Self::Player,
            Body::Enemy(enemy) => Self::Enemy(enemy),
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a combat window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombatWindowId(u32);

impl CombatWindowId {
    /// Creates a new combat window identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a platform, in generation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(u32);

impl PlatformId {
    /// Creates a new platform identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location in world space. The y axis points down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the point moved by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Visual role of a single platform tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Leftmost tile of a platform spanning two or more tiles.
    LeftCap,
    /// Interior tile.
    Middle,
    /// Rightmost tile of a platform spanning two or more tiles.
    RightCap,
    /// The only tile of a one-tile platform.
    Solo,
}

/// Single tile of a platform positioned by its centre.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformTile {
    /// Visual role of the tile.
    pub kind: TileKind,
    /// Centre of the tile.
    pub position: WorldPoint,
}

/// Horizontal run of contiguous tiles the player and enemies can stand on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlatformFields")]
pub struct Platform {
    id: PlatformId,
    origin: WorldPoint,
    length: u32,
}

/// Serialized form of [`Platform`]; decoding goes through [`Platform::new`].
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
struct PlatformFields {
    id: PlatformId,
    origin: WorldPoint,
    length: u32,
}

impl From<PlatformFields> for Platform {
    fn from(fields: PlatformFields) -> Self {
        Self::new(fields.id, fields.origin, fields.length)
    }
}

impl Platform {
    /// Creates a platform whose leftmost tile is centred on `origin`.
    ///
    /// Lengths below one are raised to one.
    #[must_use]
    pub fn new(id: PlatformId, origin: WorldPoint, length: u32) -> Self {
        Self {
            id,
            origin,
            length: length.max(1),
        }
    }

    /// Identifier assigned to the platform.
    #[must_use]
    pub const fn id(&self) -> PlatformId {
        self.id
    }

    /// Centre of the leftmost tile.
    #[must_use]
    pub const fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Number of tiles composing the platform.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Horizontal extent covered by the platform's tiles.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.length as f32 * TILE_SIZE
    }

    /// Tiles composing the platform ordered from left to right.
    #[must_use]
    pub fn tiles(&self) -> Vec<PlatformTile> {
        let last = self.length.saturating_sub(1);
        (0..self.length)
            .map(|index| {
                let kind = match index {
                    _ if last == 0 => TileKind::Solo,
                    0 => TileKind::LeftCap,
                    _ if index == last => TileKind::RightCap,
                    _ => TileKind::Middle,
                };
                PlatformTile {
                    kind,
                    position: self.origin.offset(index as f32 * TILE_SIZE, 0.0),
                }
            })
            .collect()
    }

    /// Centre of the rightmost tile.
    #[must_use]
    pub fn end_tile(&self) -> WorldPoint {
        let last = self.length.saturating_sub(1);
        self.origin.offset(last as f32 * TILE_SIZE, 0.0)
    }

    /// Spawn anchor describing the rightmost tile.
    #[must_use]
    pub fn end_marker(&self) -> EndPlatformMarker {
        EndPlatformMarker {
            platform: self.id,
            position: self.end_tile(),
            width: TILE_SIZE,
        }
    }
}

/// Reference to the rightmost tile of a generated platform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndPlatformMarker {
    /// Platform the tile belongs to.
    pub platform: PlatformId,
    /// Centre of the rightmost tile.
    pub position: WorldPoint,
    /// Width of the tile.
    pub width: f32,
}

/// Decorative lava strip drawn below the platforms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardStrip {
    /// Centre of the first surface segment.
    pub origin: WorldPoint,
    /// Horizontal distance between consecutive segments.
    pub segment_width: f32,
    /// Number of segments laid out to the right of the origin.
    pub segments: u32,
}

/// Complete description of a generated level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    platforms: Vec<Platform>,
    goal: WorldPoint,
    hazard: HazardStrip,
}

impl LevelLayout {
    /// Creates a layout from platforms in generation order.
    #[must_use]
    pub fn new(platforms: Vec<Platform>, goal: WorldPoint, hazard: HazardStrip) -> Self {
        Self {
            platforms,
            goal,
            hazard,
        }
    }

    /// Platforms in generation order.
    #[must_use]
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Location of the goal marker.
    #[must_use]
    pub const fn goal(&self) -> WorldPoint {
        self.goal
    }

    /// Lava strip drawn below the level.
    #[must_use]
    pub const fn hazard(&self) -> HazardStrip {
        self.hazard
    }

    /// End-platform markers in generation order.
    #[must_use]
    pub fn end_markers(&self) -> Vec<EndPlatformMarker> {
        self.platforms.iter().map(Platform::end_marker).collect()
    }
}

/// Record handed to the summary display when the run ends.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunSummary {
    /// Accumulated score.
    pub score: u32,
    /// Run duration formatted as `<minutes> minutes and <seconds> seconds`.
    pub time: String,
    /// Whether the player reached the goal.
    pub did_win: bool,
}

impl RunSummary {
    /// Builds a summary from the raw elapsed duration.
    #[must_use]
    pub fn new(score: u32, elapsed: Duration, did_win: bool) -> Self {
        Self {
            score,
            time: format_elapsed(elapsed),
            did_win,
        }
    }
}

/// Formats a duration as `<minutes> minutes and <seconds> seconds`.
///
/// Sub-second remainders are truncated.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{} minutes and {} seconds", total / 60, total % 60)
}
