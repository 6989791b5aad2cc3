//! Consumable resources and hazards scattered through the arena.

use serde::{Deserialize, Serialize};

use super::entity::Body;
use super::geometric_utils::{Vec2, vec2};
use super::random::RandomSource;

/// Radius of a full resource.
pub const RESOURCE_MAX_RADIUS: f32 = 16.0;
/// A resource holding less than this is gone.
pub const RESOURCE_MIN_AMOUNT: f32 = 1.0;
/// Range of the amount a new resource starts with.
pub const RESOURCE_AMOUNT_RANGE: (f32, f32) = (50.0, 100.0);
/// Seconds between two random drifts of a fire.
pub const FIRE_DRIFT_INTERVAL: f32 = 1.0;
/// Largest per-axis velocity kick of a drifting fire.
pub const FIRE_DRIFT_SPEED: f32 = 10.0;

const RESOURCE_FRICTION: f32 = 0.98;
const FIRE_FRICTION: f32 = 0.99;

/// What a resource does to a cell touching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Gives energy and mass.
    Food,
    /// Gives energy.
    Water,
    /// Burns energy; never consumed.
    Fire,
}

impl ResourceKind {
    /// Display color, also what vision rays report.
    pub fn color(self) -> [f32; 3] {
        match self {
            ResourceKind::Food => [236.0 / 255.0, 92.0 / 255.0, 116.0 / 255.0],
            ResourceKind::Water => [64.0 / 255.0, 128.0 / 255.0, 1.0],
            ResourceKind::Fire => [1.0, 0.0, 0.0],
        }
    }

    fn friction(self) -> f32 {
        match self {
            ResourceKind::Fire => FIRE_FRICTION,
            ResourceKind::Food | ResourceKind::Water => RESOURCE_FRICTION,
        }
    }
}

/// Resource payload of an entity.
#[derive(Debug, Clone)]
pub struct Resource {
    kind: ResourceKind,
    amount: f32,
    max: f32,
    drift_timer: f32,
}

impl Resource {
    /// Creates a resource holding `amount`, which is also its maximum.
    pub fn new(kind: ResourceKind, amount: f32) -> Self {
        Self {
            kind,
            amount,
            max: amount,
            drift_timer: 0.0,
        }
    }

    /// Resource with a random starting amount and the body to go with it.
    pub fn spawn(kind: ResourceKind, position: Vec2, rng: &mut RandomSource) -> (Self, Body) {
        let amount = rng.random_float(RESOURCE_AMOUNT_RANGE.0, RESOURCE_AMOUNT_RANGE.1);
        let resource = Self::new(kind, amount);
        let body = Body::new(
            position,
            amount / 100.0 * 50.0,
            RESOURCE_MAX_RADIUS,
            kind.friction(),
            kind.color(),
        );
        (resource, body)
    }

    /// Kind of this resource.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Amount left.
    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Amount the resource started with.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Takes up to `requested` and returns what was actually taken.
    ///
    /// Fire is a hazard, not a supply, and yields nothing.
    pub fn consume(&mut self, requested: f32) -> f32 {
        if self.kind == ResourceKind::Fire {
            return 0.0;
        }
        let taken = requested.clamp(0.0, self.amount);
        self.amount -= taken;
        taken
    }

    /// True once the amount dropped below the floor.
    pub fn is_depleted(&self) -> bool {
        self.amount < RESOURCE_MIN_AMOUNT
    }

    /// Per-tick resource behavior: fire drift, radius tracking the amount
    /// left, and death when depleted.
    pub fn update(&mut self, body: &mut Body, dt: f32, rng: &mut RandomSource) {
        if self.kind == ResourceKind::Fire {
            self.drift_timer += dt;
            if self.drift_timer >= FIRE_DRIFT_INTERVAL {
                self.drift_timer = 0.0;
                body.velocity = body.velocity
                    + vec2(
                        rng.random_float(-1.0, 1.0) * FIRE_DRIFT_SPEED,
                        rng.random_float(-1.0, 1.0) * FIRE_DRIFT_SPEED,
                    );
            }
        }

        self.amount = self.amount.min(self.max);
        body.radius = if self.max > 0.0 {
            self.amount / self.max * RESOURCE_MAX_RADIUS
        } else {
            0.0
        };

        if self.is_depleted() {
            body.alive = false;
        }
    }
}
