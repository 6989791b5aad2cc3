//! Entities living in the world and the physics they share.
//!
//! Every entity carries a [`Body`] (position, velocity, mass, hash membership)
//! and an [`EntityKind`] payload. Kind-specific behavior is dispatched with a
//! `match` on the payload; the generic integration, collision response and
//! boundary containment live here.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use super::cell::Cell;
use super::geometric_utils::{Vec2, dot, length, try_normalize, vec2};
use super::params::Params;
use super::resource::{Resource, ResourceKind};
use super::spatial::{HashMembership, node_coordinates};

new_key_type! {
    /// Handle of an entity in the world's entity arena.
    pub struct EntityKey;
}

/// Unique, monotonically assigned entity id. Never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Physical state shared by every entity.
#[derive(Debug, Clone)]
pub struct Body {
    /// Center of the entity's circle.
    pub position: Vec2,
    /// Heading in radians.
    pub rotation: f32,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Mass used by the collision response.
    pub mass: f32,
    /// Radius of the entity's circle.
    pub radius: f32,
    /// Velocity damping factor applied every tick.
    pub friction: f32,
    /// Cleared when a death condition is met; the world removes the entity
    /// at the end of the tick.
    pub alive: bool,
    /// Display color, also what vision rays report.
    pub color: [f32; 3],
    pub(crate) membership: HashMembership,
}

impl Body {
    /// Body at rest at `position`.
    pub fn new(position: Vec2, mass: f32, radius: f32, friction: f32, color: [f32; 3]) -> Self {
        Self {
            position,
            rotation: 0.0,
            velocity: vec2(0.0, 0.0),
            mass,
            radius,
            friction,
            alive: true,
            color,
            membership: HashMembership::default(),
        }
    }

    /// Spatial-hash registration of this body.
    pub fn membership(&self) -> &HashMembership {
        &self.membership
    }

    /// True when the node containing the position differs from the one the
    /// body is registered around.
    pub fn node_changed(&self) -> bool {
        self.membership.node() != Some(node_coordinates(self.position))
    }

    /// Moves along the velocity and applies friction.
    ///
    /// Friction is skipped for `dt == 0` so a zero tick changes nothing.
    pub fn integrate(&mut self, dt: f32) {
        self.position = self.position + self.velocity * dt;
        if dt > 0.0 {
            self.velocity = self.velocity * self.friction;
        }
    }

    /// Keeps the circle inside an arena of `world_radius` centered on the
    /// origin.
    ///
    /// When the circle pokes out, the outward velocity component is reflected
    /// about the radial normal and the center is pulled back so the rim
    /// touches the boundary. Returns whether containment kicked in.
    pub fn contain(&mut self, world_radius: f32) -> bool {
        let distance = length(self.position);
        if distance + self.radius <= world_radius {
            return false;
        }

        let Some(outward) = try_normalize(self.position) else {
            return false;
        };

        let outward_speed = dot(self.velocity, outward);
        if outward_speed > 0.0 {
            self.velocity = self.velocity - outward * (2.0 * outward_speed);
        }

        let limit = (world_radius - self.radius).max(0.0);
        self.position = outward * limit;
        true
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// An agent.
    Cell(Cell),
    /// Food, water or fire.
    Resource(Resource),
}

/// An entity owned by the world.
#[derive(Debug, Clone)]
pub struct Entity {
    /// World-assigned id.
    pub id: EntityId,
    /// Physical state.
    pub body: Body,
    /// Kind-specific payload.
    pub kind: EntityKind,
}

impl Entity {
    /// Whether this entity is a cell.
    pub fn is_cell(&self) -> bool {
        matches!(self.kind, EntityKind::Cell(_))
    }

    /// Cell payload, if any.
    pub fn as_cell(&self) -> Option<&Cell> {
        match &self.kind {
            EntityKind::Cell(cell) => Some(cell),
            EntityKind::Resource(_) => None,
        }
    }

    /// Mutable cell payload, if any.
    pub fn as_cell_mut(&mut self) -> Option<&mut Cell> {
        match &mut self.kind {
            EntityKind::Cell(cell) => Some(cell),
            EntityKind::Resource(_) => None,
        }
    }

    /// Resource payload, if any.
    pub fn as_resource(&self) -> Option<&Resource> {
        match &self.kind {
            EntityKind::Resource(resource) => Some(resource),
            EntityKind::Cell(_) => None,
        }
    }

    /// Resource kind, or `None` for a cell.
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        self.as_resource().map(Resource::kind)
    }

    /// Whether this entity is alive.
    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    /// Contact effect of `other` on this entity.
    ///
    /// Only cells react; a resource touching anything is purely physical.
    pub fn on_collision(&mut self, other: &mut Entity, params: &Params) {
        let EntityKind::Cell(cell) = &mut self.kind else {
            return;
        };

        match &mut other.kind {
            EntityKind::Cell(other_cell) => {
                cell.exchange_with(&mut self.body, other_cell, &other.body, params);
            }
            EntityKind::Resource(resource) => {
                cell.consume(&mut self.body, resource, params);
                if resource.is_depleted() {
                    other.body.alive = false;
                }
            }
        }
    }
}

/// Elastic collision response between two bodies.
///
/// Does nothing when the bodies already move apart, so an overlapping pair
/// receives one impulse rather than one per tick. Returns whether velocities
/// changed.
pub fn resolve_collision(a: &mut Body, b: &mut Body) -> bool {
    let u1 = a.velocity;
    let u2 = b.velocity;

    if dot(u1 - u2, a.position - b.position) > 0.0 {
        return false;
    }

    let m1 = a.mass;
    let m2 = b.mass;
    let sum = m1 + m2;
    if sum <= 0.0 {
        return false;
    }

    a.velocity = (u1 * (m1 - m2) + u2 * (2.0 * m2)) / sum;
    b.velocity = (u2 * (m2 - m1) + u1 * (2.0 * m1)) / sum;
    true
}
