//! Error type shared by the simulation engine.

use thiserror::Error;

/// Errors raised while building, running, or persisting a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Parameters that cannot describe a valid world.
    #[error("invalid simulation parameters: {0}")]
    InvalidParams(String),

    /// A weight slice whose length does not match the network topology.
    #[error("network expects {expected} weights, got {found}")]
    WeightCount {
        /// Weight count required by the topology.
        expected: usize,
        /// Length of the supplied slice.
        found: usize,
    },

    /// An input slice whose length does not match the network's input layer.
    #[error("network expects {expected} inputs, got {found}")]
    InputCount {
        /// Input count required by the topology.
        expected: usize,
        /// Length of the supplied slice.
        found: usize,
    },

    /// A genome that cannot drive the current network.
    #[error("genome has {found} weights but the network needs {expected}")]
    GenomeLength {
        /// Weight count required by the network.
        expected: usize,
        /// Length of the genome.
        found: usize,
    },

    /// Filesystem failure while reading or writing state.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a params or population file.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the simulation.
pub type Result<T> = std::result::Result<T, SimError>;
