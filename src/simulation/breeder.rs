//! Asexual replication with per-weight stochastic mutation.
//!
//! Each parent weight rolls a die against the parent's mutation rate and lands
//! in one of three tiers: copied verbatim, perturbed slightly, or replaced by a
//! fresh random weight. A higher mutation rate shrinks the copy tier.

use tracing::debug;

use super::dna::{Dna, Genome, Traits, random_weight};
use super::random::RandomSource;

/// Number of faces on the per-weight die.
pub const MUTATION_DIE_SIDES: i32 = 1000;
/// Largest perturbation applied in the middle tier.
pub const WEIGHT_PERTURBATION: f32 = 0.5;

const COLOR_DRIFT: f32 = 0.01;
const SPLIT_RATE_DRIFT: f32 = 2.0;
const EYE_LENGTH_DRIFT: f32 = 4.0;
const EYE_OFFSET_DRIFT: f32 = 0.05;
const MUTATION_RATE_STEP: i32 = 5;

/// Outcome of one weight roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationTier {
    /// Parent weight copied unchanged.
    Copy,
    /// Parent weight plus a small random delta.
    Perturb,
    /// Fresh independently-random weight.
    Randomize,
}

impl MutationTier {
    /// Tier for die value `dice` under `mutation_rate`.
    ///
    /// `dice >= rate` copies, `rate/3 <= dice < rate` perturbs, anything lower
    /// randomizes.
    pub fn from_roll(dice: i32, mutation_rate: i32) -> Self {
        let rate = mutation_rate.max(1);
        if dice >= rate {
            MutationTier::Copy
        } else if dice >= rate / 3 {
            MutationTier::Perturb
        } else {
            MutationTier::Randomize
        }
    }
}

/// Produces a child DNA from `parent`.
pub fn replicate(parent: &Dna, rng: &mut RandomSource) -> Dna {
    let genome = replicate_genome(&parent.genome, parent.traits.mutation_rate, rng);
    let traits = replicate_traits(&parent.traits, rng);
    Dna { genome, traits }
}

/// Copies `parent` weight by weight through the three mutation tiers.
///
/// The child always has exactly the parent's length.
pub fn replicate_genome(parent: &Genome, mutation_rate: i32, rng: &mut RandomSource) -> Genome {
    let mut mutation_count = 0usize;

    let weights: Vec<f32> = parent
        .weights()
        .iter()
        .map(|&weight| {
            let dice = rng.random_int(0, MUTATION_DIE_SIDES - 1);
            match MutationTier::from_roll(dice, mutation_rate) {
                MutationTier::Copy => weight,
                MutationTier::Perturb => {
                    mutation_count += 1;
                    weight + rng.random_float(-WEIGHT_PERTURBATION, WEIGHT_PERTURBATION)
                }
                MutationTier::Randomize => {
                    mutation_count += 1;
                    random_weight(rng)
                }
            }
        })
        .collect();

    debug!(mutation_count, total = weights.len(), "replicated genome");

    Genome::from_parent(weights)
}

/// Drifts every heritable scalar by a small random delta and clamps it.
pub fn replicate_traits(parent: &Traits, rng: &mut RandomSource) -> Traits {
    Traits {
        mutation_rate: parent.mutation_rate + rng.random_int(-MUTATION_RATE_STEP, MUTATION_RATE_STEP),
        split_rate: parent.split_rate + rng.random_float(-SPLIT_RATE_DRIFT, SPLIT_RATE_DRIFT),
        red: parent.red + rng.random_float(-COLOR_DRIFT, COLOR_DRIFT),
        green: parent.green + rng.random_float(-COLOR_DRIFT, COLOR_DRIFT),
        blue: parent.blue + rng.random_float(-COLOR_DRIFT, COLOR_DRIFT),
        eye_offset_a: parent.eye_offset_a + rng.random_float(-EYE_OFFSET_DRIFT, EYE_OFFSET_DRIFT),
        eye_offset_b: parent.eye_offset_b + rng.random_float(-EYE_OFFSET_DRIFT, EYE_OFFSET_DRIFT),
        eye_length_a: parent.eye_length_a + rng.random_float(-EYE_LENGTH_DRIFT, EYE_LENGTH_DRIFT),
        eye_length_b: parent.eye_length_b + rng.random_float(-EYE_LENGTH_DRIFT, EYE_LENGTH_DRIFT),
        eye_length_c: parent.eye_length_c + rng.random_float(-EYE_LENGTH_DRIFT, EYE_LENGTH_DRIFT),
    }
    .clamped()
}
