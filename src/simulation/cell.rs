//! Cell agents: sensing, deciding, metabolism and division.
//!
//! A tick of a cell is split in two. [`Cell::sense`] and [`Cell::think`] only
//! read world state and produce a [`CellDecision`], so they can run for many
//! cells at once. [`Cell::apply`] then commits that decision to the cell and
//! its body on the world's thread.

use std::f32::consts::PI;

use super::brain::NeuralNetwork;
use super::breeder;
use super::dna::Dna;
use super::entity::Body;
use super::error::Result;
use super::geometric_utils::{
    Vec2, closest_circle_point, direction, distance_squared, from_angle, normalize_range, vec2,
    wrap_angle,
};
use super::params::{INPUT_COUNT, Params};
use super::random::RandomSource;
use super::resource::{Resource, ResourceKind};
use super::vision::{EYE_COUNT, INPUTS_PER_EYE, Vision};

/// Recurrent scalars fed from one tick's outputs to the next tick's inputs.
pub const MEMORY_SIZE: usize = 2;

const VISION_INPUT_OFFSET: usize = INPUT_COUNT - EYE_COUNT * INPUTS_PER_EYE;
const MIN_RADIUS_INPUT: f32 = 1.0;

/// Outcome of one cell's sense-and-think step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDecision {
    /// Signed thrust in `[-1, 1]`.
    pub thrust: f32,
    /// Signed turn in `[-1, 1]`, positive turns left.
    pub turn: f32,
    /// Values to remember for the next tick.
    pub memory: [f32; MEMORY_SIZE],
    /// What the cell saw this tick.
    pub vision: Vision,
}

/// Cell payload of an entity.
#[derive(Debug, Clone)]
pub struct Cell {
    generation: u32,
    energy: f32,
    dna: Dna,
    split_timer: f32,
    age: f32,
    memory: [f32; MEMORY_SIZE],
    vision: Vision,
}

impl Cell {
    /// Creates a cell of `generation` carrying `dna`.
    pub fn new(generation: u32, dna: Dna, energy: f32) -> Self {
        Self {
            generation,
            energy,
            dna,
            split_timer: 0.0,
            age: 0.0,
            memory: [0.0; MEMORY_SIZE],
            vision: Vision::default(),
        }
    }

    /// Builds a cell and its body at `position`.
    pub fn spawn(
        generation: u32,
        dna: Dna,
        position: Vec2,
        energy: f32,
        mass: f32,
        params: &Params,
    ) -> (Self, Body) {
        let body = Body::new(
            position,
            mass,
            radius_for_mass(mass, params),
            params.cell_friction,
            dna.traits.color(),
        );
        (Self::new(generation, dna, energy), body)
    }

    /// Number of ancestors plus one; random cells are generation 1.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Current energy reserve.
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Overrides the energy reserve.
    pub fn set_energy(&mut self, energy: f32) {
        self.energy = energy;
    }

    /// Heritable material.
    pub fn dna(&self) -> &Dna {
        &self.dna
    }

    /// Seconds since the last split (or birth).
    pub fn split_timer(&self) -> f32 {
        self.split_timer
    }

    /// Seconds since birth.
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Memory carried into the next tick.
    pub fn memory(&self) -> [f32; MEMORY_SIZE] {
        self.memory
    }

    /// Rays from the last applied decision.
    pub fn vision(&self) -> &Vision {
        &self.vision
    }

    /// Casts the vision rays against nearby circles.
    pub fn sense<'a>(&self, body: &Body, neighbors: impl IntoIterator<Item = &'a Body>) -> Vision {
        let mut vision = Vision::cast(body.position, body.rotation, &self.dna.traits);
        for other in neighbors {
            if other.alive {
                vision.observe(other.position, other.radius, other.color);
            }
        }
        vision
    }

    /// Fills the network input vector.
    pub fn write_inputs(&self, body: &Body, vision: &Vision, params: &Params, inputs: &mut [f32; INPUT_COUNT]) {
        let world_radius = params.world_radius;
        let wall_point = closest_circle_point(vec2(0.0, 0.0), world_radius, body.position);
        let wall_distance = distance_squared(wall_point, body.position).sqrt();
        let wall_direction = wrap_angle(body.rotation - direction(wall_point, body.position));

        inputs[0] = normalize_range(wrap_angle(body.rotation), -PI, PI);
        inputs[1] = normalize_range(body.radius, MIN_RADIUS_INPUT, params.max_radius);
        inputs[2] = normalize_range(self.energy, 0.0, params.max_energy);
        inputs[3] = normalize_range(wall_distance, 0.0, world_radius);
        inputs[4] = normalize_range(wall_direction, -PI, PI);
        inputs[5..VISION_INPUT_OFFSET].copy_from_slice(&self.memory);
        vision.write_inputs(&mut inputs[VISION_INPUT_OFFSET..]);
    }

    /// Runs the genome through `network` against the assembled inputs.
    ///
    /// `network` is scratch: its weights are replaced by this cell's genome.
    pub fn think(
        &self,
        body: &Body,
        vision: Vision,
        network: &mut NeuralNetwork,
        params: &Params,
        inputs: &mut [f32; INPUT_COUNT],
    ) -> Result<CellDecision> {
        self.write_inputs(body, &vision, params, inputs);

        network.set_weights(self.dna.genome.weights())?;
        let outputs = network.compute_outputs(inputs.as_slice())?;

        Ok(CellDecision {
            thrust: outputs[0],
            turn: outputs[1],
            memory: [outputs[2], outputs[3]],
            vision,
        })
    }

    /// Commits a decision: timers, steering, memory and metabolism.
    pub fn apply(&mut self, body: &mut Body, decision: &CellDecision, dt: f32, params: &Params) {
        self.age += dt;
        self.split_timer += dt;

        body.rotation = wrap_angle(body.rotation + decision.turn * params.turn_speed * dt);
        body.velocity = body.velocity + from_angle(body.rotation) * (decision.thrust * params.thrust * dt);

        self.memory = decision.memory;
        self.vision = decision.vision;

        self.energy -= params.energy_decay * dt;
        self.update_vitals(body, params);
    }

    /// Clamps energy and mass, derives the radius and flags death.
    pub fn update_vitals(&mut self, body: &mut Body, params: &Params) {
        self.energy = self.energy.clamp(0.0, params.max_energy);
        body.mass = body.mass.clamp(1.0, params.max_mass);
        body.radius = radius_for_mass(body.mass, params);

        if self.is_starving(body, params) {
            body.alive = false;
        }
    }

    /// Energy or mass below the survivable floor.
    pub fn is_starving(&self, body: &Body, params: &Params) -> bool {
        self.energy < params.min_energy || body.mass < params.min_mass
    }

    /// Whether the cell divides this tick.
    ///
    /// Either its split interval ran out and it can pay the split cost with
    /// enough mass for two viable halves, or it is well fed and the shorter
    /// minimum interval passed.
    pub fn wants_split(&self, body: &Body, params: &Params) -> bool {
        let scheduled = self.split_timer >= self.dna.traits.split_rate
            && self.energy >= params.split_cost
            && body.mass >= 2.0 * params.min_mass;
        let surplus = self.energy >= params.split_energy
            && body.mass >= params.split_mass
            && self.split_timer >= params.split_min_time;
        body.alive && (scheduled || surplus)
    }

    /// Divides the cell, returning the offspring placed at `position`.
    ///
    /// The parent pays the split cost, then energy and mass are shared
    /// equally. The offspring is launched against the parent's velocity.
    pub fn divide(&mut self, body: &mut Body, position: Vec2, rng: &mut RandomSource, params: &Params) -> (Cell, Body) {
        self.energy = (self.energy - params.split_cost).max(0.0);
        let energy = self.energy * 0.5;
        let mass = body.mass * 0.5;

        self.energy = energy;
        self.split_timer = 0.0;
        body.mass = mass;
        body.radius = radius_for_mass(mass, params);

        let dna = breeder::replicate(&self.dna, rng);
        let (child, mut child_body) = Cell::spawn(self.generation + 1, dna, position, energy, mass, params);
        child_body.velocity = -body.velocity;
        child_body.rotation = rng.random_angle();

        (child, child_body)
    }

    /// Contact with another cell: the heavier one feeds on the lighter one.
    pub fn exchange_with(&mut self, body: &mut Body, other: &mut Cell, other_body: &Body, params: &Params) {
        let gain = params.contact_drain * 0.5;
        if other_body.mass < body.mass {
            other.energy -= params.contact_drain;
            self.energy += gain;
            body.mass += gain;
        } else {
            other.energy += params.contact_drain;
            self.energy -= gain;
            body.mass -= gain;
        }
    }

    /// Contact with a resource.
    pub fn consume(&mut self, body: &mut Body, resource: &mut Resource, params: &Params) {
        match resource.kind() {
            ResourceKind::Food => {
                let eaten = resource.consume(params.bite_size);
                self.energy += eaten;
                body.mass += eaten * params.food_mass_yield;
            }
            ResourceKind::Water => {
                let drunk = resource.consume(params.bite_size);
                self.energy += drunk * params.water_energy_yield;
            }
            ResourceKind::Fire => {
                self.energy -= params.fire_damage;
            }
        }
    }
}

/// Radius of a cell of `mass`.
pub fn radius_for_mass(mass: f32, params: &Params) -> f32 {
    if params.max_mass <= 0.0 {
        return 0.0;
    }
    mass / params.max_mass * params.max_radius
}
