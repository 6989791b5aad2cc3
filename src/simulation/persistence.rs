//! Save and reload of the genetic state of a population.
//!
//! Only what is heritable survives a restart: each cell's generation, traits
//! and genome. Positions, energy and resources are rebuilt fresh.

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dna::{Dna, Genome, Traits};
use super::error::{Result, SimError};

/// Heritable state of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Generation of the cell.
    pub generation: u32,
    /// Heritable scalars.
    pub traits: Traits,
    /// Genome weights.
    pub weights: Vec<f32>,
}

impl CellRecord {
    /// Record of a living cell.
    pub fn new(generation: u32, dna: &Dna) -> Self {
        Self {
            generation,
            traits: dna.traits,
            weights: dna.genome.weights().to_vec(),
        }
    }

    /// Rebuilds the DNA, checking the genome against the network size.
    /// Traits edited out of range on disk are clamped back.
    pub fn into_dna(self, weight_count: usize) -> Result<Dna> {
        let genome = Genome::from_weights(self.weights, weight_count)?;
        Ok(Dna {
            genome,
            traits: self.traits.clamped(),
        })
    }
}

/// On-disk population snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// Network weight count the genomes were evolved for.
    pub weight_count: usize,
    /// One record per living cell.
    pub cells: Vec<CellRecord>,
}

impl PopulationSnapshot {
    /// Snapshot stamped with the current time.
    pub fn new(weight_count: usize, cells: Vec<CellRecord>) -> Self {
        Self {
            saved_at: Utc::now(),
            weight_count,
            cells,
        }
    }

    /// Writes the snapshot as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a snapshot and checks every genome against `weight_count`.
    ///
    /// A missing file is not an error: there is simply no prior population.
    pub fn load_from_file(path: impl AsRef<Path>, weight_count: usize) -> Result<Option<Self>> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot: Self = serde_json::from_str(&json)?;

        if snapshot.weight_count != weight_count {
            return Err(SimError::GenomeLength {
                expected: weight_count,
                found: snapshot.weight_count,
            });
        }
        if let Some(record) = snapshot.cells.iter().find(|r| r.weights.len() != weight_count) {
            return Err(SimError::GenomeLength {
                expected: weight_count,
                found: record.weights.len(),
            });
        }

        Ok(Some(snapshot))
    }
}
