use std::path::{Path, PathBuf};

use log::{debug, trace};
use rand::Rng;

use crate::activation::Sigmoid;
use crate::error::{NetError, Result};
use crate::loss::SquaredError;
use crate::math::init::UniformInit;
use crate::network::topology::Topology;

/// Step size used when the caller does not pick one.
pub const DEFAULT_LEARNING_RATE: f64 = 0.03;

/// Whether a call to [`NeuralNetwork::run`] should also update the parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunMode<'a> {
    /// Forward pass only.
    Inference,
    /// Forward pass followed by one backpropagation step towards this target.
    Training(&'a [f64]),
}

/// A fully-connected feed-forward network with sigmoid activations.
///
/// All numeric state lives in flat buffers addressed through [`Topology`].
/// Weights and biases change only during construction, restore, and training
/// runs. Activations are overwritten by every forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    pub(crate) topology: Topology,
    pub(crate) activations: Vec<f64>,
    /// Scratch for the backward pass, laid out like `activations`.
    pub(crate) deltas: Vec<f64>,
    pub(crate) weights: Vec<f64>,
    pub(crate) biases: Vec<f64>,
    pub(crate) learning_rate: f64,
    pub(crate) identity: PathBuf,
}

impl NeuralNetwork {
    /// Builds a randomly initialized network with the default learning rate,
    /// drawing from the thread-local generator.
    pub fn new(layer_sizes: &[usize]) -> Result<NeuralNetwork> {
        NeuralNetwork::with_learning_rate(layer_sizes, DEFAULT_LEARNING_RATE)
    }

    pub fn with_learning_rate(layer_sizes: &[usize], learning_rate: f64) -> Result<NeuralNetwork> {
        NeuralNetwork::random(
            layer_sizes,
            learning_rate,
            UniformInit::default(),
            &mut rand::thread_rng(),
        )
    }

    /// Builds a network whose weights, biases and identity are all drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        learning_rate: f64,
        init: UniformInit,
        rng: &mut R,
    ) -> Result<NeuralNetwork> {
        let topology = Topology::new(layer_sizes)?;
        validate_learning_rate(learning_rate)?;
        init.validate()?;

        let mut weights = vec![0.0; topology.weight_count()];
        let mut biases = vec![0.0; topology.bias_count()];
        init.fill(&mut weights, rng);
        init.fill(&mut biases, rng);

        let identity = PathBuf::from(format!("neural_network_{}.txt", rng.gen::<u32>()));
        debug!(
            "created network {:?} with {} weights, identity {}",
            topology.sizes(),
            weights.len(),
            identity.display()
        );

        Ok(NeuralNetwork::from_parts(topology, learning_rate, weights, biases, identity))
    }

    /// Assembles a network from buffers already laid out for `topology`.
    pub(crate) fn from_parts(
        topology: Topology,
        learning_rate: f64,
        weights: Vec<f64>,
        biases: Vec<f64>,
        identity: PathBuf,
    ) -> NeuralNetwork {
        debug_assert_eq!(weights.len(), topology.weight_count());
        debug_assert_eq!(biases.len(), topology.bias_count());
        let activations = vec![0.0; topology.node_count()];
        let deltas = vec![0.0; topology.node_count()];
        NeuralNetwork {
            topology,
            activations,
            deltas,
            weights,
            biases,
            learning_rate,
            identity,
        }
    }

    /// Runs `input` through the network and returns the output layer.
    ///
    /// In [`RunMode::Training`] the forward pass is followed by an in-place
    /// gradient step. The returned values are still the pre-update output.
    /// Both vectors are checked before anything is touched, so a
    /// `DimensionMismatch` leaves the network unchanged.
    pub fn run(&mut self, input: &[f64], mode: RunMode<'_>) -> Result<Vec<f64>> {
        check_len("input", input.len(), self.topology.input_width())?;
        if let RunMode::Training(expected) = mode {
            check_len("expected output", expected.len(), self.topology.output_width())?;
        }

        self.forward(input);

        if let RunMode::Training(expected) = mode {
            self.backpropagate(expected);
            let cost = SquaredError::loss(self.output(), expected);
            trace!("training step, cost before update {cost}");
        }

        Ok(self.output().to_vec())
    }

    /// Shorthand for `run(input, RunMode::Inference)`.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.run(input, RunMode::Inference)
    }

    /// Shorthand for `run(input, RunMode::Training(expected))`.
    pub fn train(&mut self, input: &[f64], expected: &[f64]) -> Result<Vec<f64>> {
        self.run(input, RunMode::Training(expected))
    }

    /// Squared error of the most recent forward pass against `expected`.
    pub fn cost(&self, expected: &[f64]) -> Result<f64> {
        check_len("expected output", expected.len(), self.topology.output_width())?;
        Ok(SquaredError::loss(self.output(), expected))
    }

    fn forward(&mut self, input: &[f64]) {
        let topology = &self.topology;
        self.activations[topology.layer_range(0)].copy_from_slice(input);

        for layer in 1..topology.layer_count() {
            let (before, rest) = self.activations.split_at_mut(topology.layer_range(layer).start);
            let prev = &before[topology.layer_range(layer - 1)];
            let biases = &self.biases[topology.bias_range(layer)];

            for (node, (out, bias)) in rest.iter_mut().zip(biases).enumerate() {
                let total: f64 = self.weights[topology.weight_row(layer, node)]
                    .iter()
                    .zip(prev)
                    .map(|(w, a)| w * a)
                    .sum();
                *out = Sigmoid::function(total + bias);
            }
        }
    }

    /// Activations of the output layer from the last forward pass.
    pub fn output(&self) -> &[f64] {
        &self.activations[self.topology.layer_range(self.topology.output_layer())]
    }

    /// Activations of any layer from the last forward pass; layer 0 is the input.
    pub fn activations(&self, layer: usize) -> &[f64] {
        &self.activations[self.topology.layer_range(layer)]
    }

    pub fn identity(&self) -> &Path {
        &self.identity
    }

    pub fn layer_sizes(&self) -> &[usize] {
        self.topology.sizes()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Weight on the connection from node `prev_node` of layer `layer - 1`
    /// to node `node` of `layer`.
    ///
    /// # Panics
    /// Panics if `layer` is 0 or any index is outside the topology.
    pub fn weight(&self, layer: usize, node: usize, prev_node: usize) -> f64 {
        self.check_layer(layer, node);
        assert!(
            prev_node < self.topology.width(layer - 1),
            "previous node {prev_node} out of range"
        );
        self.weights[self.topology.weight_index(layer, node, prev_node)]
    }

    /// # Panics
    /// Panics if `layer` is 0 or any index is outside the topology.
    pub fn bias(&self, layer: usize, node: usize) -> f64 {
        self.check_layer(layer, node);
        self.biases[self.topology.bias_index(layer, node)]
    }

    fn check_layer(&self, layer: usize, node: usize) {
        assert!(
            layer >= 1 && layer < self.topology.layer_count(),
            "layer {layer} has no incoming weights"
        );
        assert!(node < self.topology.width(layer), "node {node} out of range for layer {layer}");
    }
}

pub(crate) fn validate_learning_rate(learning_rate: f64) -> Result<()> {
    if learning_rate.is_finite() && learning_rate > 0.0 {
        Ok(())
    } else {
        Err(NetError::config(format!(
            "learning rate must be positive and finite, got {learning_rate}"
        )))
    }
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(NetError::DimensionMismatch { what, got, expected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::snapshot::{LayerSnapshot, NetworkSnapshot};
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn seeded(layer_sizes: &[usize], learning_rate: f64, seed: u64) -> NeuralNetwork {
        NeuralNetwork::random(
            layer_sizes,
            learning_rate,
            UniformInit::default(),
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap()
    }

    fn single_connection(weight: f64, bias: f64, learning_rate: f64) -> NeuralNetwork {
        NeuralNetwork::from_snapshot(
            NetworkSnapshot {
                learning_rate,
                layer_sizes: vec![1, 1],
                layers: vec![LayerSnapshot {
                    biases: vec![bias],
                    weights: vec![vec![weight]],
                }],
            },
            "single.txt",
        )
        .unwrap()
    }

    #[test]
    fn topology_is_validated() {
        assert!(matches!(NeuralNetwork::new(&[3]), Err(NetError::InvalidTopology { .. })));
        assert!(matches!(NeuralNetwork::new(&[3, 0, 2]), Err(NetError::InvalidTopology { .. })));
    }

    #[test]
    fn learning_rate_must_be_positive() {
        for lr in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                NeuralNetwork::with_learning_rate(&[2, 1], lr),
                Err(NetError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn fresh_parameters_are_in_range() {
        let net = seeded(&[3, 4, 2], DEFAULT_LEARNING_RATE, 1);
        assert_eq!(net.layer_sizes(), &[3, 4, 2]);
        assert_eq!(net.learning_rate(), DEFAULT_LEARNING_RATE);
        assert!(net.weights.iter().chain(&net.biases).all(|x| (-0.5..=0.5).contains(x)));
        assert!(net.identity().to_string_lossy().starts_with("neural_network_"));
    }

    #[test]
    fn same_seed_builds_the_same_network() {
        assert_eq!(seeded(&[2, 3, 1], 0.1, 9), seeded(&[2, 3, 1], 0.1, 9));
        assert_ne!(seeded(&[2, 3, 1], 0.1, 9).weights, seeded(&[2, 3, 1], 0.1, 10).weights);
    }

    #[test]
    fn known_forward_value() {
        let mut net = single_connection(1.0, 0.0, DEFAULT_LEARNING_RATE);
        let out = net.predict(&[0.5]).unwrap();
        assert_abs_diff_eq!(out[0], 0.622459, epsilon = 1e-5);
        assert_eq!(net.activations(0), &[0.5]);
    }

    #[test]
    fn forward_uses_weights_and_biases() {
        let mut net = single_connection(-2.0, 0.75, DEFAULT_LEARNING_RATE);
        let out = net.predict(&[0.3]).unwrap();
        assert_abs_diff_eq!(out[0], Sigmoid::function(-2.0 * 0.3 + 0.75), epsilon = 1e-12);
    }

    #[test]
    fn forward_is_deterministic() {
        let mut net = seeded(&[3, 5, 2], DEFAULT_LEARNING_RATE, 3);
        let first = net.predict(&[0.1, -0.4, 0.9]).unwrap();
        let second = net.predict(&[0.1, -0.4, 0.9]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn inference_leaves_parameters_alone() {
        let mut net = seeded(&[2, 2, 1], DEFAULT_LEARNING_RATE, 4);
        let before = (net.weights.clone(), net.biases.clone());
        net.predict(&[1.0, 0.0]).unwrap();
        assert_eq!((net.weights.clone(), net.biases.clone()), before);
    }

    #[test]
    fn dimension_mismatch_leaves_state_unchanged() {
        let mut net = seeded(&[3, 2], DEFAULT_LEARNING_RATE, 5);
        net.predict(&[0.2, 0.4, 0.6]).unwrap();
        let before = net.clone();

        assert!(matches!(
            net.predict(&[1.0, 2.0]),
            Err(NetError::DimensionMismatch { what: "input", got: 2, expected: 3 })
        ));
        assert!(matches!(
            net.train(&[1.0, 2.0, 3.0], &[0.5]),
            Err(NetError::DimensionMismatch { what: "expected output", got: 1, expected: 2 })
        ));
        assert!(matches!(
            net.run(&[1.0, 2.0, 3.0], RunMode::Training(&[])),
            Err(NetError::DimensionMismatch { .. })
        ));
        assert!(matches!(net.cost(&[0.0; 3]), Err(NetError::DimensionMismatch { .. })));
        assert_eq!(net, before);
    }

    #[test]
    fn training_returns_pre_update_output() {
        let mut trained = seeded(&[2, 3, 1], 0.5, 6);
        let mut reference = trained.clone();
        let out = trained.train(&[0.3, 0.8], &[0.9]).unwrap();
        assert_eq!(out, reference.predict(&[0.3, 0.8]).unwrap());
        assert_ne!(trained.weights, reference.weights);
    }

    #[test]
    fn cost_is_squared_error_of_last_output() {
        let mut net = single_connection(1.0, 0.0, DEFAULT_LEARNING_RATE);
        net.predict(&[0.5]).unwrap();
        let a = Sigmoid::function(0.5);
        assert_abs_diff_eq!(net.cost(&[1.0]).unwrap(), (a - 1.0).powi(2), epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "has no incoming weights")]
    fn input_layer_has_no_bias() {
        seeded(&[2, 1], DEFAULT_LEARNING_RATE, 0).bias(0, 0);
    }
}
