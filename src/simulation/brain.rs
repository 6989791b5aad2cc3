//! Fixed-topology feed-forward network driving cell behavior.
//!
//! One input layer, one hidden layer and one output layer, all with a clamped
//! hyperbolic-tangent activation. The network holds no per-cell state: a
//! cell's genome is loaded with [`NeuralNetwork::set_weights`] right before
//! [`NeuralNetwork::compute_outputs`] runs, so callers that evaluate cells
//! concurrently give each worker its own clone.

use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};

/// Layer sizes of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Number of input neurons.
    pub inputs: usize,
    /// Number of hidden neurons.
    pub hidden: usize,
    /// Number of output neurons.
    pub outputs: usize,
}

impl Topology {
    /// Creates a topology.
    pub fn new(inputs: usize, hidden: usize, outputs: usize) -> Self {
        Self {
            inputs,
            hidden,
            outputs,
        }
    }

    /// Total weight count in flattening order: input-to-hidden weights,
    /// hidden biases, hidden-to-output weights, output biases.
    pub fn weight_count(&self) -> usize {
        self.inputs * self.hidden + self.hidden + self.hidden * self.outputs + self.outputs
    }
}

/// Hyperbolic tangent clamped to exactly ±1 outside `[-10, 10]`.
#[inline]
pub fn hyper_tan(x: f32) -> f32 {
    if x < -10.0 {
        -1.0
    } else if x > 10.0 {
        1.0
    } else {
        x.tanh()
    }
}

/// Two-layer perceptron with contiguous weight buffers.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    topology: Topology,
    /// Input-to-hidden weights (`inputs` × `hidden`).
    input_weights: Array2<f32>,
    hidden_biases: Array1<f32>,
    /// Hidden-to-output weights (`hidden` × `outputs`).
    output_weights: Array2<f32>,
    output_biases: Array1<f32>,
    hidden: Array1<f32>,
    outputs: Array1<f32>,
}

impl NeuralNetwork {
    /// Creates a network with all weights zeroed.
    pub fn new(topology: Topology) -> Result<Self> {
        if topology.inputs == 0 || topology.hidden == 0 || topology.outputs == 0 {
            return Err(SimError::InvalidParams(format!(
                "network layers must be non-empty, got {:?}",
                topology
            )));
        }

        Ok(Self {
            topology,
            input_weights: Array2::zeros((topology.inputs, topology.hidden)),
            hidden_biases: Array1::zeros(topology.hidden),
            output_weights: Array2::zeros((topology.hidden, topology.outputs)),
            output_biases: Array1::zeros(topology.outputs),
            hidden: Array1::zeros(topology.hidden),
            outputs: Array1::zeros(topology.outputs),
        })
    }

    /// Layer sizes of this network.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Number of weights a genome must carry to drive this network.
    pub fn weight_count(&self) -> usize {
        self.topology.weight_count()
    }

    /// Loads a flat weight vector into the four weight/bias buffers.
    pub fn set_weights(&mut self, weights: &[f32]) -> Result<()> {
        let expected = self.weight_count();
        if weights.len() != expected {
            return Err(SimError::WeightCount {
                expected,
                found: weights.len(),
            });
        }

        let (chunk, rest) = weights.split_at(self.input_weights.len());
        copy_into(self.input_weights.iter_mut(), chunk);
        let (chunk, rest) = rest.split_at(self.hidden_biases.len());
        copy_into(self.hidden_biases.iter_mut(), chunk);
        let (chunk, rest) = rest.split_at(self.output_weights.len());
        copy_into(self.output_weights.iter_mut(), chunk);
        copy_into(self.output_biases.iter_mut(), rest);

        Ok(())
    }

    /// Runs the forward pass and returns the output activations.
    ///
    /// The result depends only on the loaded weights and `inputs`.
    pub fn compute_outputs(&mut self, inputs: &[f32]) -> Result<ArrayView1<'_, f32>> {
        if inputs.len() != self.topology.inputs {
            return Err(SimError::InputCount {
                expected: self.topology.inputs,
                found: inputs.len(),
            });
        }

        let x = ArrayView1::from(inputs);

        self.hidden.assign(&self.hidden_biases);
        general_mat_vec_mul(1.0, &self.input_weights.t(), &x, 1.0, &mut self.hidden);
        self.hidden.mapv_inplace(hyper_tan);

        self.outputs.assign(&self.output_biases);
        general_mat_vec_mul(1.0, &self.output_weights.t(), &self.hidden, 1.0, &mut self.outputs);
        self.outputs.mapv_inplace(hyper_tan);

        Ok(self.outputs.view())
    }
}

/// Row-major copy; both arrays are in standard layout, so `row * cols + col`
/// of the flat slice lands at `[row, col]`.
fn copy_into<'a>(dst: impl Iterator<Item = &'a mut f32>, src: &[f32]) {
    for (d, s) in dst.zip(src) {
        *d = *s;
    }
}
