//! # Cellsim - Artificial Life in a Circular Arena
//!
//! Cells with tiny neural-network brains roam a bounded 2D world, look around
//! with three vision rays, eat, collide, split into mutated offspring and die.
//! There is no training signal beyond survival: the genome of every cell is
//! its network's weight vector, and replication with mutation is the only
//! learning that happens.
//!
//! ## Features
//!
//! - Feed-forward network (one hidden layer, clamped tanh) on `ndarray`
//! - Per-weight copy / perturb / randomize mutation with heritable rate
//! - Fat-registered uniform-grid spatial hash for neighbor queries
//! - Elastic collisions, circular arena containment
//! - Food, water and drifting fire resources
//! - Parallel sensing and decision phase with `rayon`
//! - Save/load of the population's genetic state
//!
//! ## Core Modules
//!
//! - [`simulation::world`] - Entity arena and the per-tick update
//! - [`simulation::cell`] - Cell sensing, decisions and division
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::breeder`] - Replication with mutation
//! - [`simulation::spatial`] - Spatial hash

/// Core simulation logic and data structures.
pub mod simulation {
    /// Neural network driving cell behavior.
    pub mod brain;
    /// Replication of DNA with mutation.
    pub mod breeder;
    /// Cell agents.
    pub mod cell;
    /// Genome and heritable traits.
    pub mod dna;
    /// Entities and the physics they share.
    pub mod entity;
    /// Error type of the engine.
    pub mod error;
    /// Deferred population changes.
    pub mod events;
    /// Geometric utility functions for distance calculations.
    pub mod geometric_utils;
    /// Simulation parameters.
    pub mod params;
    /// Population save files.
    pub mod persistence;
    /// Seeded random numbers.
    pub mod random;
    /// Food, water and fire.
    pub mod resource;
    /// Uniform-grid spatial hash.
    pub mod spatial;
    /// Population statistics.
    pub mod stats;
    /// Vision rays.
    pub mod vision;
    /// The world and its update loop.
    pub mod world;
}
