#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-facing collaborator contracts and the per-frame level driver.
//!
//! The host owns physics, input and presentation. The driver translates
//! world events into physics calls and physics contacts into world commands,
//! so the simulation never touches a host runtime directly.

mod driver;

use anyhow::Result as AnyResult;
use glam::Vec2;
use lava_run_core::{Body, Collidable, RunSummary, WorldPoint};

pub use driver::{DriverConfig, LevelDriver};

/// Physics runtime the level runs inside.
///
/// Every body is addressed by the [`Collidable`] tag the world uses for it.
/// Positions are body centres in world units, with y growing downwards.
pub trait PhysicsHost {
    /// Adds a body described by the provided spec.
    fn create_body(&mut self, spec: BodySpec);

    /// Removes a body. Unknown bodies are ignored.
    fn destroy_body(&mut self, body: Collidable);

    /// Overrides the body's horizontal velocity.
    fn set_velocity_x(&mut self, body: Collidable, velocity: f32);

    /// Overrides the body's vertical velocity.
    fn set_velocity_y(&mut self, body: Collidable, velocity: f32);

    /// Sets the fraction of velocity kept after bouncing off a surface.
    fn set_bounce(&mut self, body: Collidable, bounce: f32);

    /// Enables or disables collision handling for the body.
    fn set_enabled(&mut self, body: Collidable, enabled: bool);

    /// Current centre of the body, if it exists.
    fn position(&self, body: Collidable) -> Option<Vec2>;

    /// Reports whether the body rests on a surface.
    fn is_grounded(&self, body: Collidable) -> bool;

    /// Moves every contact gathered since the previous call into `out`.
    fn drain_contacts(&mut self, out: &mut Vec<Contact>);
}

/// Contact reported by the physics host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Two bodies overlap, in no particular order.
    Overlap(Collidable, Collidable),
    /// A dynamic body crossed the world's lower bound.
    WorldBoundsExit(Body),
}

/// Simulation role of a physics body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Affected by gravity, collides with platforms.
    Dynamic,
    /// Immovable surface.
    Static,
    /// Reports overlaps without resolving them.
    Sensor,
}

/// Description of a body the driver asks the host to create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySpec {
    /// Tag identifying the body in contacts.
    pub tag: Collidable,
    /// Simulation role of the body.
    pub kind: BodyKind,
    /// Centre of the body.
    pub position: Vec2,
    /// Width and height of the body.
    pub size: Vec2,
}

impl BodySpec {
    /// Creates a spec centred on the provided world point.
    #[must_use]
    pub fn new(tag: Collidable, kind: BodyKind, position: WorldPoint, size: Vec2) -> Self {
        Self {
            tag,
            kind,
            position: to_vec2(position),
            size,
        }
    }
}

/// Keys the level polls every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Jump.
    Up,
    /// Attack.
    Action,
}

/// Polled keyboard state.
pub trait InputSource {
    /// Reports whether the key is held during the current frame.
    fn is_down(&self, key: Key) -> bool;
}

/// Surface that presents the terminal run record.
pub trait SummaryDisplay {
    /// Presents the summary of a finished run.
    fn show(&mut self, summary: &RunSummary) -> AnyResult<()>;
}

/// Renders the end-of-run message shown to the player.
#[must_use]
pub fn render_summary(summary: &RunSummary) -> String {
    if summary.did_win {
        format!(
            "Congratulations!\nYou finished in {} and scored {} points!",
            summary.time, summary.score
        )
    } else {
        format!(
            "Game Over!\nYou scored {} points.\nYou lasted {}.",
            summary.score, summary.time
        )
    }
}

pub(crate) fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

pub(crate) fn to_world_point(position: Vec2) -> WorldPoint {
    WorldPoint::new(position.x, position.y)
}
