//! Heritable material of a cell: the network genome plus scalar traits.
//!
//! A [`Genome`] is the flat weight vector for the shared network; [`Traits`]
//! are the non-network parameters (color, split timing, mutation rate and
//! vision geometry). Both are owned by exactly one cell and deep-copied on
//! reproduction.

use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};
use super::random::RandomSource;

/// Lower bound of a freshly drawn genome weight.
pub const WEIGHT_MIN: f32 = -1.0;
/// Upper bound of a freshly drawn genome weight.
pub const WEIGHT_MAX: f32 = 1.0;

/// Valid range of the split interval, in seconds.
pub const SPLIT_RATE_RANGE: (f32, f32) = (5.0, 120.0);
/// Range of the split interval given to random cells.
pub const INITIAL_SPLIT_RATE_RANGE: (f32, f32) = (10.0, 60.0);
/// Valid range of each vision ray length.
pub const EYE_LENGTH_RANGE: (f32, f32) = (48.0, 128.0);
/// Valid range of the two side-ray angular offsets, in radians.
pub const EYE_OFFSET_RANGE: (f32, f32) = (0.05, 1.5);
/// Valid range of the mutation rate (per mille chance of touching a weight).
pub const MUTATION_RATE_RANGE: (i32, i32) = (1, 1000);
/// Range of the mutation rate given to random cells.
pub const INITIAL_MUTATION_RATE_RANGE: (i32, i32) = (20, 200);

/// Flat weight vector sized to the network's weight count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    weights: Vec<f32>,
}

impl Genome {
    /// Draws `weight_count` independent random weights.
    pub fn new_random(weight_count: usize, rng: &mut RandomSource) -> Self {
        let weights = (0..weight_count).map(|_| random_weight(rng)).collect();
        Self { weights }
    }

    /// Wraps an existing weight vector, rejecting one of the wrong length.
    pub fn from_weights(weights: Vec<f32>, weight_count: usize) -> Result<Self> {
        if weights.len() != weight_count {
            return Err(SimError::GenomeLength {
                expected: weight_count,
                found: weights.len(),
            });
        }
        Ok(Self { weights })
    }

    /// Wraps weights derived from a parent of known-good length.
    pub(crate) fn from_parent(weights: Vec<f32>) -> Self {
        Self { weights }
    }

    /// Read-only view of the weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of weights.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True for a genome without weights.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Fresh independently-random genome weight.
#[inline]
pub fn random_weight(rng: &mut RandomSource) -> f32 {
    rng.random_float(WEIGHT_MIN, WEIGHT_MAX)
}

/// Heritable scalars that are not network weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Per mille chance that a weight is perturbed or redrawn on replication.
    pub mutation_rate: i32,
    /// Seconds between splits.
    pub split_rate: f32,
    /// Display color, red channel in `[0, 1]`.
    pub red: f32,
    /// Display color, green channel in `[0, 1]`.
    pub green: f32,
    /// Display color, blue channel in `[0, 1]`.
    pub blue: f32,
    /// Angle subtracted from the rotation for the second vision ray.
    pub eye_offset_a: f32,
    /// Angle added to the rotation for the third vision ray.
    pub eye_offset_b: f32,
    /// Length of the forward vision ray.
    pub eye_length_a: f32,
    /// Length of the second vision ray.
    pub eye_length_b: f32,
    /// Length of the third vision ray.
    pub eye_length_c: f32,
}

impl Traits {
    /// Random trait set for a cell with no parent.
    pub fn new_random(rng: &mut RandomSource) -> Self {
        Self {
            mutation_rate: rng.random_int(INITIAL_MUTATION_RATE_RANGE.0, INITIAL_MUTATION_RATE_RANGE.1),
            split_rate: rng.random_float(INITIAL_SPLIT_RATE_RANGE.0, INITIAL_SPLIT_RATE_RANGE.1),
            red: rng.random_float(0.0, 1.0),
            green: rng.random_float(0.0, 1.0),
            blue: rng.random_float(0.0, 1.0),
            eye_offset_a: rng.random_float(EYE_OFFSET_RANGE.0, EYE_OFFSET_RANGE.1),
            eye_offset_b: rng.random_float(EYE_OFFSET_RANGE.0, EYE_OFFSET_RANGE.1),
            eye_length_a: rng.random_float(EYE_LENGTH_RANGE.0, EYE_LENGTH_RANGE.1),
            eye_length_b: rng.random_float(EYE_LENGTH_RANGE.0, EYE_LENGTH_RANGE.1),
            eye_length_c: rng.random_float(EYE_LENGTH_RANGE.0, EYE_LENGTH_RANGE.1),
        }
    }

    /// Clamps every scalar into its valid range.
    pub fn clamped(mut self) -> Self {
        self.mutation_rate = self
            .mutation_rate
            .clamp(MUTATION_RATE_RANGE.0, MUTATION_RATE_RANGE.1);
        self.split_rate = self.split_rate.clamp(SPLIT_RATE_RANGE.0, SPLIT_RATE_RANGE.1);
        self.red = self.red.clamp(0.0, 1.0);
        self.green = self.green.clamp(0.0, 1.0);
        self.blue = self.blue.clamp(0.0, 1.0);
        self.eye_offset_a = self.eye_offset_a.clamp(EYE_OFFSET_RANGE.0, EYE_OFFSET_RANGE.1);
        self.eye_offset_b = self.eye_offset_b.clamp(EYE_OFFSET_RANGE.0, EYE_OFFSET_RANGE.1);
        self.eye_length_a = self.eye_length_a.clamp(EYE_LENGTH_RANGE.0, EYE_LENGTH_RANGE.1);
        self.eye_length_b = self.eye_length_b.clamp(EYE_LENGTH_RANGE.0, EYE_LENGTH_RANGE.1);
        self.eye_length_c = self.eye_length_c.clamp(EYE_LENGTH_RANGE.0, EYE_LENGTH_RANGE.1);
        self
    }

    /// Display color as `[r, g, b]`.
    pub fn color(&self) -> [f32; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Genome and traits travelling together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dna {
    /// Network weights.
    pub genome: Genome,
    /// Non-network heritable scalars.
    pub traits: Traits,
}

impl Dna {
    /// Random DNA for a network needing `weight_count` weights.
    pub fn new_random(weight_count: usize, rng: &mut RandomSource) -> Self {
        Self {
            genome: Genome::new_random(weight_count, rng),
            traits: Traits::new_random(rng),
        }
    }
}
