use serde::{Deserialize, Serialize};

use super::resource::ResourceKind;

/// Running counters of population dynamics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    /// Offspring produced by splits.
    pub births: u64,
    /// Cells removed after dying.
    pub cell_deaths: u64,
    /// Food resources eaten up.
    pub food_depleted: u64,
    /// Water resources drunk up.
    pub water_depleted: u64,
    /// Random cells spawned to keep the population at its floor.
    pub replacements: u64,
    /// Resources respawned after being depleted.
    pub respawns: u64,
    /// Highest generation ever alive.
    pub max_generation: u32,
    /// Completed ticks.
    pub ticks: u64,
    /// Simulated seconds.
    pub time: f64,
}

impl WorldStats {
    /// Records a completed tick of `dt` seconds.
    pub fn record_tick(&mut self, dt: f32) {
        self.ticks += 1;
        self.time += f64::from(dt);
    }

    /// Records an offspring of `generation`.
    pub fn record_birth(&mut self, generation: u32) {
        self.births += 1;
        self.record_generation(generation);
    }

    /// Tracks the highest generation seen.
    pub fn record_generation(&mut self, generation: u32) {
        self.max_generation = self.max_generation.max(generation);
    }

    /// Records a cell death.
    pub fn record_cell_death(&mut self) {
        self.cell_deaths += 1;
    }

    /// Records a depleted resource.
    pub fn record_depleted(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::Food => self.food_depleted += 1,
            ResourceKind::Water => self.water_depleted += 1,
            ResourceKind::Fire => {}
        }
    }

    /// Records a population-floor replacement.
    pub fn record_replacement(&mut self) {
        self.replacements += 1;
    }

    /// Records a resource respawn.
    pub fn record_respawn(&mut self) {
        self.respawns += 1;
    }
}
