use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};
use super::spatial::MAX_WORLD_RADIUS;

/// Number of network inputs: rotation, radius, energy, wall distance, wall
/// direction, two memory scalars and three vision rays of (proximity, r, g, b).
pub const INPUT_COUNT: usize = 19;
/// Number of network outputs: thrust, turn and two memory scalars.
pub const OUTPUT_COUNT: usize = 4;

/// Simulation parameters that control world behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Radius of the circular arena, centered on the origin.
    pub world_radius: f32,
    /// Cells spawned (or topped up to) on initialization.
    pub initial_cells: usize,
    /// Food resources spawned on initialization.
    pub initial_food: usize,
    /// Water resources spawned on initialization.
    pub initial_water: usize,
    /// Fire hazards spawned on initialization.
    pub initial_fire: usize,
    /// A cell death at or below this many living cells spawns a random cell.
    pub population_floor: usize,
    /// Neurons in the single hidden layer.
    pub hidden_count: usize,
    /// Seed for the world's random source.
    pub seed: u64,
    /// Population snapshot loaded on initialize and written on destroy.
    pub save_path: Option<PathBuf>,

    /// Largest cell mass; radius scales linearly up to `max_radius`.
    pub max_mass: f32,
    /// Cell radius at `max_mass`.
    pub max_radius: f32,
    /// Upper bound of a cell's energy reserve.
    pub max_energy: f32,
    /// Energy and mass of a freshly spawned random cell.
    pub initial_energy: f32,
    /// Energy lost per simulated second.
    pub energy_decay: f32,
    /// A cell dies when its energy drops below this.
    pub min_energy: f32,
    /// A cell dies when its mass drops below this.
    pub min_mass: f32,
    /// Per-tick velocity damping of a cell.
    pub cell_friction: f32,
    /// Acceleration at full thrust output, in units per second squared.
    pub thrust: f32,
    /// Rotation speed at full turn output, in radians per second.
    pub turn_speed: f32,

    /// Energy a cell needs for an early split.
    pub split_energy: f32,
    /// Mass a cell needs for an early split.
    pub split_mass: f32,
    /// Seconds that must pass before an early split.
    pub split_min_time: f32,
    /// Energy spent by the parent on each split.
    pub split_cost: f32,
    /// Gap between parent and offspring rims at birth.
    pub split_padding: f32,

    /// Amount taken from a food or water resource per contact tick.
    pub bite_size: f32,
    /// Mass gained per unit of food eaten.
    pub food_mass_yield: f32,
    /// Energy gained per unit of water drunk.
    pub water_energy_yield: f32,
    /// Energy lost per contact tick with fire.
    pub fire_damage: f32,
    /// Energy drained from a lighter cell on contact.
    pub contact_drain: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            world_radius: 2048.0,
            initial_cells: 50,
            initial_food: 250,
            initial_water: 50,
            initial_fire: 10,
            population_floor: 10,
            hidden_count: 16,
            seed: 42,
            save_path: None,

            max_mass: 100.0,
            max_radius: 30.0,
            max_energy: 100.0,
            initial_energy: 100.0,
            energy_decay: 2.5,
            min_energy: 1.0,
            min_mass: 2.0,
            cell_friction: 0.98,
            thrust: 100.0,
            turn_speed: 5.0,

            split_energy: 50.0,
            split_mass: 20.0,
            split_min_time: 5.0,
            split_cost: 25.0,
            split_padding: 10.0,

            bite_size: 8.0,
            food_mass_yield: 0.5,
            water_energy_yield: 0.5,
            fire_damage: 8.0,
            contact_drain: 8.0,
        }
    }
}

impl Params {
    /// Rejects parameter sets the world cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if !self.world_radius.is_finite() || self.world_radius <= 0.0 {
            return Err(SimError::InvalidParams(format!(
                "world_radius must be positive, got {}",
                self.world_radius
            )));
        }
        if self.world_radius > MAX_WORLD_RADIUS {
            return Err(SimError::InvalidParams(format!(
                "world_radius must be at most {}, got {}",
                MAX_WORLD_RADIUS, self.world_radius
            )));
        }
        if self.hidden_count == 0 {
            return Err(SimError::InvalidParams(
                "hidden_count must be at least 1".to_string(),
            ));
        }
        let limits = [
            ("max_mass", self.max_mass),
            ("max_energy", self.max_energy),
            ("max_radius", self.max_radius),
        ];
        for (name, value) in limits {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidParams(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Saves the parameters as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads parameters from JSON; missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Parameters from `config` if given, otherwise the defaults, with the
    /// seed overridden when `seed` is set.
    pub fn resolve(config: Option<&Path>, seed: Option<u64>) -> Result<Self> {
        let mut params = match config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        if let Some(seed) = seed {
            params.seed = seed;
        }
        Ok(params)
    }
}
