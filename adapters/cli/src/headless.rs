//! Minimal arcade physics used to play a level without a window.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use lava_run_core::{Body, Collidable};
use lava_run_host::{BodyKind, BodySpec, Contact, PhysicsHost};

const LANDING_TOLERANCE: f32 = 4.0;
const REST_SPEED: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
struct SimBody {
    kind: BodyKind,
    position: Vec2,
    size: Vec2,
    velocity: Vec2,
    bounce: f32,
    enabled: bool,
    grounded: bool,
    exited: bool,
}

impl SimBody {
    fn min(&self) -> Vec2 {
        self.position - self.size / 2.0
    }

    fn max(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    fn overlaps(&self, other: &Self) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

/// Gravity, platform landing, overlap detection and a collidable lower bound.
///
/// Bodies pass through platform sides; only landing from above is resolved.
#[derive(Debug)]
pub(crate) struct HeadlessPhysics {
    bodies: BTreeMap<Collidable, SimBody>,
    gravity: f32,
    floor: f32,
    contacts: Vec<Contact>,
}

impl HeadlessPhysics {
    pub(crate) fn new(gravity: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravity,
            floor: f32::INFINITY,
            contacts: Vec::new(),
        }
    }

    /// Sets the y coordinate bodies report leaving the world at.
    pub(crate) fn set_floor(&mut self, floor: f32) {
        self.floor = floor;
    }

    /// Integrates every dynamic body and records the resulting contacts.
    pub(crate) fn step(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        let surfaces: Vec<SimBody> = self
            .bodies
            .values()
            .filter(|body| body.kind == BodyKind::Static)
            .copied()
            .collect();

        for (tag, body) in &mut self.bodies {
            if body.kind != BodyKind::Dynamic || body.exited || !body.enabled {
                continue;
            }

            let previous_bottom = body.max().y;
            body.velocity.y += self.gravity * seconds;
            body.position += body.velocity * seconds;
            body.grounded = false;

            if body.velocity.y >= 0.0 {
                land(body, previous_bottom, &surfaces);
            }

            if body.max().y >= self.floor {
                body.position.y = self.floor - body.size.y / 2.0;
                body.velocity = Vec2::ZERO;
                body.exited = true;
                if let Some(exited) = as_body(*tag) {
                    log::debug!("{exited:?} left the world");
                    self.contacts.push(Contact::WorldBoundsExit(exited));
                }
            }
        }

        self.collect_overlaps();
    }

    fn collect_overlaps(&mut self) {
        let movers: Vec<(Collidable, SimBody)> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.enabled && body.kind != BodyKind::Static)
            .map(|(tag, body)| (*tag, *body))
            .collect();

        for (index, (first, a)) in movers.iter().enumerate() {
            for (second, b) in &movers[index + 1..] {
                if a.overlaps(b) {
                    self.contacts.push(Contact::Overlap(*first, *second));
                }
            }
        }
    }
}

fn land(body: &mut SimBody, previous_bottom: f32, surfaces: &[SimBody]) {
    for surface in surfaces {
        let top = surface.min().y;
        let horizontal = body.min().x < surface.max().x && surface.min().x < body.max().x;
        if !horizontal || previous_bottom > top + LANDING_TOLERANCE || body.max().y < top {
            continue;
        }

        body.position.y = top - body.size.y / 2.0;
        body.velocity.y = -body.velocity.y * body.bounce;
        if body.velocity.y.abs() < REST_SPEED {
            body.velocity.y = 0.0;
        }
        body.grounded = true;
        return;
    }
}

fn as_body(tag: Collidable) -> Option<Body> {
    match tag {
        Collidable::Player => Some(Body::Player),
        Collidable::Enemy(enemy) => Some(Body::Enemy(enemy)),
        Collidable::CombatWindow(_) | Collidable::Platform(_) | Collidable::Goal => None,
    }
}

impl PhysicsHost for HeadlessPhysics {
    fn create_body(&mut self, spec: BodySpec) {
        let _ = self.bodies.insert(
            spec.tag,
            SimBody {
                kind: spec.kind,
                position: spec.position,
                size: spec.size,
                velocity: Vec2::ZERO,
                bounce: 0.0,
                enabled: true,
                grounded: false,
                exited: false,
            },
        );
    }

    fn destroy_body(&mut self, body: Collidable) {
        let _ = self.bodies.remove(&body);
    }

    fn set_velocity_x(&mut self, body: Collidable, velocity: f32) {
        if let Some(entry) = self.bodies.get_mut(&body) {
            entry.velocity.x = velocity;
        }
    }

    fn set_velocity_y(&mut self, body: Collidable, velocity: f32) {
        if let Some(entry) = self.bodies.get_mut(&body) {
            entry.velocity.y = velocity;
        }
    }

    fn set_bounce(&mut self, body: Collidable, bounce: f32) {
        if let Some(entry) = self.bodies.get_mut(&body) {
            entry.bounce = bounce;
        }
    }

    fn set_enabled(&mut self, body: Collidable, enabled: bool) {
        if let Some(entry) = self.bodies.get_mut(&body) {
            entry.enabled = enabled;
        }
    }

    fn position(&self, body: Collidable) -> Option<Vec2> {
        self.bodies.get(&body).map(|entry| entry.position)
    }

    fn is_grounded(&self, body: Collidable) -> bool {
        self.bodies.get(&body).is_some_and(|entry| entry.grounded)
    }

    fn drain_contacts(&mut self, out: &mut Vec<Contact>) {
        out.append(&mut self.contacts);
    }
}
