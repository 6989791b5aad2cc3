//! The world: entity arena, spatial hash and the per-tick update loop.
//!
//! A tick runs in four steps:
//! - Every living cell senses and decides in parallel against a frozen view
//!   of the world, each worker with its own copy of the network
//! - Entities are stepped one after another: decisions applied, motion
//!   integrated, collisions resolved, hash membership refreshed
//! - Dead entities are removed from the arena and from every hash node
//! - Queued births, floor replacements and respawns are applied

use std::path::Path;

use rayon::prelude::*;
use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, info, warn};

use super::brain::{NeuralNetwork, Topology};
use super::cell::{Cell, CellDecision};
use super::dna::Dna;
use super::entity::{Body, Entity, EntityId, EntityKey, EntityKind, resolve_collision};
use super::error::Result;
use super::events::{EventQueue, SimulationEvent};
use super::geometric_utils::{Vec2, circles_intersect, from_angle, length_squared};
use super::params::{INPUT_COUNT, OUTPUT_COUNT, Params};
use super::persistence::{CellRecord, PopulationSnapshot};
use super::random::RandomSource;
use super::resource::{Resource, ResourceKind};
use super::spatial::{HashMembership, NodeBounds, SpatialHash};
use super::stats::WorldStats;

/// Attempts at placing an offspring next to its parent before falling back
/// to a random point.
pub const SPLIT_PLACEMENT_TRIES: usize = 10;

/// The simulated arena and everything in it.
pub struct World {
    params: Params,
    rng: RandomSource,
    network: NeuralNetwork,
    entities: SlotMap<EntityKey, Entity>,
    hash: SpatialHash,
    events: EventQueue,
    stats: WorldStats,
    next_id: u64,
    cell_count: usize,
    time: f32,
    debug: bool,
    debug_geometry: Vec<NodeBounds>,
    tracked: Option<EntityKey>,
    decisions: SecondaryMap<EntityKey, CellDecision>,
    keys: Vec<EntityKey>,
    dead: Vec<EntityKey>,
    neighbors: Vec<EntityKey>,
}

impl World {
    /// Builds an empty world; call [`World::initialize`] to populate it.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;

        let topology = Topology::new(INPUT_COUNT, params.hidden_count, OUTPUT_COUNT);
        let network = NeuralNetwork::new(topology)?;

        Ok(Self {
            rng: RandomSource::new(params.seed),
            hash: SpatialHash::new(params.world_radius),
            params,
            network,
            entities: SlotMap::with_key(),
            events: EventQueue::new(),
            stats: WorldStats::default(),
            next_id: 0,
            cell_count: 0,
            time: 0.0,
            debug: false,
            debug_geometry: Vec::new(),
            tracked: None,
            decisions: SecondaryMap::new(),
            keys: Vec::new(),
            dead: Vec::new(),
            neighbors: Vec::new(),
        })
    }

    /// Populates the world from scratch.
    ///
    /// The saved population is reloaded when a save path is configured, then
    /// topped up with random cells to the initial count, and the resources
    /// are scattered. On error the world is left empty.
    pub fn initialize(&mut self) -> Result<()> {
        let result = self.populate();
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn populate(&mut self) -> Result<()> {
        self.clear();

        let weight_count = self.network.weight_count();
        if let Some(path) = self.params.save_path.clone() {
            match PopulationSnapshot::load_from_file(&path, weight_count)? {
                Some(snapshot) => {
                    let loaded = snapshot.cells.len();
                    for record in snapshot.cells {
                        let generation = record.generation.max(1);
                        let dna = record.into_dna(weight_count)?;
                        let position = self.random_world_point();
                        self.spawn_cell(generation, dna, position);
                    }
                    info!(loaded, path = %path.display(), saved_at = %snapshot.saved_at, "loaded population");
                }
                None => info!(path = %path.display(), "no saved population, starting fresh"),
            }
        }

        while self.cell_count < self.params.initial_cells {
            self.spawn_random_cell();
        }

        let resources = [
            (ResourceKind::Food, self.params.initial_food),
            (ResourceKind::Water, self.params.initial_water),
            (ResourceKind::Fire, self.params.initial_fire),
        ];
        for (kind, count) in resources {
            for _ in 0..count {
                self.spawn_resource(kind);
            }
        }

        if self.debug {
            self.rebuild_debug_geometry();
        }

        info!(
            cells = self.cell_count,
            entities = self.entities.len(),
            radius = self.params.world_radius,
            weights = weight_count,
            "world initialized"
        );
        Ok(())
    }

    /// Saves the population (when a save path is configured) and empties
    /// the world.
    pub fn destroy(&mut self) -> Result<()> {
        let saved = match self.params.save_path.clone() {
            Some(path) => self.save_population(&path),
            None => Ok(()),
        };
        self.clear();
        saved
    }

    /// Writes the genetic state of every living cell to `path`.
    pub fn save_population(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = self.population_snapshot();
        snapshot.save_to_file(&path)?;
        info!(cells = snapshot.cells.len(), path = %path.as_ref().display(), "saved population");
        Ok(())
    }

    /// Genetic state of every living cell.
    pub fn population_snapshot(&self) -> PopulationSnapshot {
        let cells = self
            .entities
            .values()
            .filter(|entity| entity.is_alive())
            .filter_map(|entity| entity.as_cell())
            .map(|cell| CellRecord::new(cell.generation(), cell.dna()))
            .collect();
        PopulationSnapshot::new(self.network.weight_count(), cells)
    }

    fn clear(&mut self) {
        self.entities.clear();
        self.hash.clear();
        self.events.clear();
        self.decisions.clear();
        self.debug_geometry.clear();
        self.cell_count = 0;
        self.tracked = None;
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// `dt == 0` runs all bookkeeping but moves nothing. Fails only when a
    /// genome does not fit the network.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.decide_cells()?;
        self.time += dt;

        let mut hash_changed = false;
        let mut keys = std::mem::take(&mut self.keys);
        keys.clear();
        keys.extend(self.entities.keys());
        for &key in &keys {
            hash_changed |= self.step_entity(key, dt);
        }
        self.keys = keys;

        hash_changed |= self.sweep_dead();
        hash_changed |= self.apply_events();
        self.stats.record_tick(dt);

        if hash_changed && self.debug {
            self.rebuild_debug_geometry();
        }
        Ok(())
    }

    /// Parallel phase: sense and think for every living cell.
    fn decide_cells(&mut self) -> Result<()> {
        self.keys.clear();
        self.keys.extend(
            self.entities
                .iter()
                .filter(|(_, entity)| entity.is_cell() && entity.is_alive())
                .map(|(key, _)| key),
        );

        let entities = &self.entities;
        let hash = &self.hash;
        let params = &self.params;
        let network = &self.network;

        let decisions = self
            .keys
            .par_iter()
            .map_init(
                || (network.clone(), Vec::new(), [0.0; INPUT_COUNT]),
                |(network, neighbors, inputs), &key| -> Result<Option<(EntityKey, CellDecision)>> {
                    let Some(entity) = entities.get(key) else {
                        return Ok(None);
                    };
                    let Some(cell) = entity.as_cell() else {
                        return Ok(None);
                    };

                    hash.query_into(key, &entity.body.membership, true, neighbors);
                    let seen = neighbors
                        .iter()
                        .filter_map(|&other| entities.get(other))
                        .map(|other| &other.body);
                    let vision = cell.sense(&entity.body, seen);
                    let decision = cell.think(&entity.body, vision, network, params, inputs)?;

                    Ok(Some((key, decision)))
                },
            )
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>>>()?;

        self.decisions.clear();
        for (key, decision) in decisions {
            self.decisions.insert(key, decision);
        }
        Ok(())
    }

    /// Sequential phase for one entity. Returns whether its hash membership
    /// changed.
    fn step_entity(&mut self, key: EntityKey, dt: f32) -> bool {
        let params = &self.params;

        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };
        if !entity.body.alive {
            return false;
        }

        match &mut entity.kind {
            EntityKind::Cell(cell) => {
                if let Some(decision) = self.decisions.get(key) {
                    cell.apply(&mut entity.body, decision, dt, params);
                }
            }
            EntityKind::Resource(resource) => resource.update(&mut entity.body, dt, &mut self.rng),
        }

        entity.body.integrate(dt);

        // Narrow phase: own node only.
        self.hash.query_into(key, &entity.body.membership, false, &mut self.neighbors);
        for &other_key in &self.neighbors {
            let Some([this, other]) = self.entities.get_disjoint_mut([key, other_key]) else {
                continue;
            };
            if !other.body.alive
                || !circles_intersect(this.body.position, this.body.radius, other.body.position, other.body.radius)
            {
                continue;
            }

            resolve_collision(&mut this.body, &mut other.body);
            this.on_collision(other, params);
        }

        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };

        entity.body.contain(params.world_radius);

        let mut hash_changed = false;
        if entity.body.node_changed() {
            let position = entity.body.position;
            self.hash.register_entity(key, position, &mut entity.body.membership);
            hash_changed = true;
        }

        let id = entity.id;
        if let EntityKind::Cell(cell) = &mut entity.kind {
            if cell.wants_split(&entity.body, params) {
                let offset = entity.body.radius * 2.0 + params.split_padding;
                let position = place_offspring(entity.body.position, offset, params.world_radius, &mut self.rng);
                let (child, body) = cell.divide(&mut entity.body, position, &mut self.rng, params);

                debug!(
                    parent = id.0,
                    generation = child.generation(),
                    energy = child.energy(),
                    mass = body.mass,
                    "cell split"
                );
                self.events.push(SimulationEvent::Split {
                    parent: id,
                    cell: Box::new(child),
                    body,
                });
            }
        }

        hash_changed
    }

    /// Removes every dead entity from the arena and the hash, queueing the
    /// matching death events. Returns whether anything was removed.
    fn sweep_dead(&mut self) -> bool {
        let params = &self.params;
        let mut dead = std::mem::take(&mut self.dead);
        dead.clear();

        for (key, entity) in &mut self.entities {
            if let EntityKind::Cell(cell) = &entity.kind {
                if cell.is_starving(&entity.body, params) {
                    entity.body.alive = false;
                }
            }
            if !entity.body.alive {
                dead.push(key);
            }
        }

        for &key in &dead {
            let Some(mut entity) = self.entities.remove(key) else {
                continue;
            };
            self.hash.unregister(key, &mut entity.body.membership);
            self.decisions.remove(key);
            if self.tracked == Some(key) {
                self.tracked = None;
            }

            match entity.kind {
                EntityKind::Cell(cell) => self.events.push(SimulationEvent::CellDied {
                    id: entity.id,
                    generation: cell.generation(),
                }),
                EntityKind::Resource(resource) => self.events.push(SimulationEvent::ResourceDepleted {
                    id: entity.id,
                    kind: resource.kind(),
                    position: entity.body.position,
                }),
            }
        }

        let removed = !dead.is_empty();
        self.dead = dead;
        removed
    }

    /// Applies queued events in order. Returns whether any entity was added.
    fn apply_events(&mut self) -> bool {
        let mut events = std::mem::take(&mut self.events);
        let mut added = false;

        for event in events.drain() {
            match event {
                SimulationEvent::Split { parent, cell, body } => {
                    let generation = cell.generation();
                    self.add(body, EntityKind::Cell(*cell));
                    self.stats.record_birth(generation);
                    debug!(parent = parent.0, generation, "offspring added");
                    added = true;
                }
                SimulationEvent::CellDied { id, generation } => {
                    self.stats.record_cell_death();
                    // The dying cell still counts here.
                    let at_floor = self.cell_count <= self.params.population_floor;
                    self.cell_count = self.cell_count.saturating_sub(1);
                    if at_floor {
                        self.spawn_random_cell();
                        self.stats.record_replacement();
                        info!(
                            dead = id.0,
                            generation,
                            cells = self.cell_count,
                            "population at floor, spawned a random cell"
                        );
                        added = true;
                    }
                }
                SimulationEvent::ResourceDepleted { id, kind, position } => {
                    self.stats.record_depleted(kind);
                    self.spawn_resource(kind);
                    self.stats.record_respawn();
                    debug!(resource = id.0, ?kind, x = position.x, y = position.y, "resource respawned");
                    added = true;
                }
            }
        }

        self.events = events;
        added
    }

    /// Inserts an entity, assigning it a fresh id and registering it in the
    /// spatial hash.
    pub fn add(&mut self, mut body: Body, kind: EntityKind) -> EntityKey {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        body.membership = HashMembership::default();
        let position = body.position;
        let generation = match &kind {
            EntityKind::Cell(cell) => Some(cell.generation()),
            EntityKind::Resource(_) => None,
        };

        let key = self.entities.insert(Entity { id, body, kind });
        if let Some(entity) = self.entities.get_mut(key) {
            self.hash.register_entity(key, position, &mut entity.body.membership);
        }

        if let Some(generation) = generation {
            self.cell_count += 1;
            self.stats.record_generation(generation);
        }
        key
    }

    /// Adds a full-grown cell carrying `dna` at `position`.
    pub fn spawn_cell(&mut self, generation: u32, dna: Dna, position: Vec2) -> EntityKey {
        let (cell, mut body) = Cell::spawn(
            generation,
            dna,
            position,
            self.params.initial_energy,
            self.params.max_mass,
            &self.params,
        );
        body.rotation = self.rng.random_angle();
        self.add(body, EntityKind::Cell(cell))
    }

    /// Adds a generation-1 cell with random DNA at a random point.
    pub fn spawn_random_cell(&mut self) -> EntityKey {
        let dna = Dna::new_random(self.network.weight_count(), &mut self.rng);
        let position = self.random_world_point();
        self.spawn_cell(1, dna, position)
    }

    /// Adds a resource of `kind` at a random point.
    pub fn spawn_resource(&mut self, kind: ResourceKind) -> EntityKey {
        let position = self.random_world_point();
        let (resource, body) = Resource::spawn(kind, position, &mut self.rng);
        self.add(body, EntityKind::Resource(resource))
    }

    /// Uniformly distributed point inside the arena.
    pub fn random_world_point(&mut self) -> Vec2 {
        random_point_in_circle(&mut self.rng, self.params.world_radius)
    }

    /// Whether `point` lies inside the arena; the boundary itself counts as
    /// inside.
    pub fn is_point_in_world(&self, point: Vec2) -> bool {
        point_in_circle(point, self.params.world_radius)
    }

    /// Whether the entity's center lies inside the arena.
    pub fn is_entity_in_world(&self, entity: &Entity) -> bool {
        self.is_point_in_world(entity.body.position)
    }

    /// Arena radius.
    pub fn radius(&self) -> f32 {
        self.params.world_radius
    }

    /// Parameters the world was built with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Shared network topology.
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Spatial hash over the live entities.
    pub fn spatial_hash(&self) -> &SpatialHash {
        &self.hash
    }

    /// Iterates the live entities.
    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    /// Entity behind `key`, if still alive.
    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Mutable entity behind `key`. Hash membership follows a moved entity
    /// on the next update.
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// The `index`-th entity in arena order.
    pub fn entity_at(&self, index: usize) -> Option<&Entity> {
        self.entities.values().nth(index)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of live cells.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Simulated seconds since creation.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Running population counters.
    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// Turns spatial-hash debug geometry on or off.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        if debug {
            self.rebuild_debug_geometry();
        } else {
            self.debug_geometry.clear();
        }
    }

    /// Whether debug geometry is maintained.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Node bounds of the spatial hash, empty unless debug is on.
    pub fn debug_geometry(&self) -> &[NodeBounds] {
        &self.debug_geometry
    }

    fn rebuild_debug_geometry(&mut self) {
        self.debug_geometry = self.hash.debug_geometry();
    }

    /// Key of the cell the camera follows.
    pub fn tracked_key(&self) -> Option<EntityKey> {
        self.tracked
    }

    /// The cell the camera follows.
    pub fn tracked_entity(&self) -> Option<&Entity> {
        self.tracked.and_then(|key| self.entities.get(key))
    }

    /// Follows the next living cell in arena order, wrapping around.
    pub fn track_next(&mut self) -> Option<EntityKey> {
        self.step_tracking(true)
    }

    /// Follows the previous living cell in arena order, wrapping around.
    pub fn track_previous(&mut self) -> Option<EntityKey> {
        self.step_tracking(false)
    }

    fn step_tracking(&mut self, forward: bool) -> Option<EntityKey> {
        let cells: Vec<EntityKey> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.is_cell() && entity.is_alive())
            .map(|(key, _)| key)
            .collect();
        if cells.is_empty() {
            self.tracked = None;
            return None;
        }

        let current = self.tracked.and_then(|key| cells.iter().position(|&k| k == key));
        let index = match (current, forward) {
            (Some(i), true) => (i + 1) % cells.len(),
            (Some(i), false) => (i + cells.len() - 1) % cells.len(),
            (None, true) => 0,
            (None, false) => cells.len() - 1,
        };

        self.tracked = Some(cells[index]);
        self.tracked
    }
}

/// Area-uniform random point in a circle of `radius` around the origin.
pub fn random_point_in_circle(rng: &mut RandomSource, radius: f32) -> Vec2 {
    let angle = rng.random_angle();
    let distance = rng.random_float(0.0, 1.0).sqrt() * radius;
    from_angle(angle) * distance
}

/// Inclusive circle membership test.
pub fn point_in_circle(point: Vec2, radius: f32) -> bool {
    length_squared(point) <= radius * radius
}

/// Spot for an offspring `offset` away from `origin`, retried at random
/// angles until it lands inside the arena.
fn place_offspring(origin: Vec2, offset: f32, world_radius: f32, rng: &mut RandomSource) -> Vec2 {
    for _ in 0..SPLIT_PLACEMENT_TRIES {
        let candidate = origin + from_angle(rng.random_angle()) * offset;
        if point_in_circle(candidate, world_radius) {
            return candidate;
        }
    }

    warn!(
        x = origin.x,
        y = origin.y,
        "no room next to parent, placing offspring at a random point"
    );
    random_point_in_circle(rng, world_radius)
}
