use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use crate::network::network::{validate_learning_rate, NeuralNetwork};
use crate::network::topology::Topology;

/// Parameters of one non-input layer, in node order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub biases: Vec<f64>,
    /// `weights[n][m]` connects node `m` of the previous layer to node `n`.
    pub weights: Vec<Vec<f64>>,
}

/// Owned, nested copy of everything a network persists.
///
/// `layers[i]` describes layer `i + 1`; the input layer has no parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub learning_rate: f64,
    pub layer_sizes: Vec<usize>,
    pub layers: Vec<LayerSnapshot>,
}

impl NeuralNetwork {
    pub fn to_snapshot(&self) -> NetworkSnapshot {
        let topology = &self.topology;
        let layers = (1..topology.layer_count())
            .map(|layer| LayerSnapshot {
                biases: self.biases[topology.bias_range(layer)].to_vec(),
                weights: (0..topology.width(layer))
                    .map(|node| self.weights[topology.weight_row(layer, node)].to_vec())
                    .collect(),
            })
            .collect();

        NetworkSnapshot {
            learning_rate: self.learning_rate,
            layer_sizes: topology.sizes().to_vec(),
            layers,
        }
    }

    /// Rebuilds a network from a snapshot, checking every shape against
    /// `layer_sizes`. Any inconsistency is reported as `CorruptState`.
    pub fn from_snapshot(
        snapshot: NetworkSnapshot,
        identity: impl Into<PathBuf>,
    ) -> Result<NeuralNetwork> {
        let topology = Topology::new(&snapshot.layer_sizes).map_err(|_| {
            NetError::corrupt(format!("invalid layer sizes {:?}", snapshot.layer_sizes))
        })?;
        validate_learning_rate(snapshot.learning_rate).map_err(|_| {
            NetError::corrupt(format!("invalid learning rate {}", snapshot.learning_rate))
        })?;

        if snapshot.layers.len() != topology.layer_count() - 1 {
            return Err(NetError::corrupt(format!(
                "{} parameter layers for {} declared layers",
                snapshot.layers.len(),
                topology.layer_count()
            )));
        }

        let mut weights = Vec::new();
        let mut biases = Vec::new();
        for (i, layer) in snapshot.layers.into_iter().enumerate() {
            let index = i + 1;
            let width = topology.width(index);
            let fan_in = topology.width(index - 1);
            if layer.biases.len() != width || layer.weights.len() != width {
                return Err(NetError::corrupt(format!(
                    "layer {index} has {} biases and {} weight rows, expected {width}",
                    layer.biases.len(),
                    layer.weights.len()
                )));
            }
            if let Some(row) = layer.weights.iter().position(|row| row.len() != fan_in) {
                return Err(NetError::corrupt(format!(
                    "layer {index} node {row} has {} weights, expected {fan_in}",
                    layer.weights[row].len()
                )));
            }
            biases.extend(layer.biases);
            weights.extend(layer.weights.into_iter().flatten());
        }

        Ok(NeuralNetwork::from_parts(
            topology,
            snapshot.learning_rate,
            weights,
            biases,
            identity.into(),
        ))
    }

    /// Serializes the parameters to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.to_snapshot())
            .map_err(|e| NetError::Io(e.into()))?;
        info!("saved network {:?} as json to {}", self.layer_sizes(), path.display());
        Ok(())
    }

    /// Loads a network written by [`NeuralNetwork::save_json`]. The text
    /// identity becomes the same path with a `.txt` extension.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NeuralNetwork> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let snapshot: NetworkSnapshot = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                NetError::Io(e.into())
            } else {
                NetError::corrupt(e.to_string())
            }
        })?;
        NeuralNetwork::from_snapshot(snapshot, path.with_extension("txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::init::UniformInit;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample() -> NetworkSnapshot {
        NetworkSnapshot {
            learning_rate: 0.1,
            layer_sizes: vec![2, 1],
            layers: vec![LayerSnapshot { biases: vec![0.5], weights: vec![vec![1.0, -1.0]] }],
        }
    }

    #[test]
    fn snapshot_round_trip_is_exact() {
        let net = NeuralNetwork::random(
            &[3, 4, 2],
            0.03,
            UniformInit::default(),
            &mut StdRng::seed_from_u64(8),
        )
        .unwrap();
        let snapshot = net.to_snapshot();
        assert_eq!(snapshot.layers.len(), 2);
        assert_eq!(snapshot.layers[1].weights[1][3], net.weight(2, 1, 3));

        let rebuilt = NeuralNetwork::from_snapshot(snapshot, net.identity()).unwrap();
        assert_eq!(rebuilt, net);
    }

    #[test]
    fn shape_errors_are_corrupt_state() {
        let mut missing_layer = sample();
        missing_layer.layers.clear();

        let mut short_row = sample();
        short_row.layers[0].weights[0].pop();

        let mut extra_bias = sample();
        extra_bias.layers[0].biases.push(0.0);

        let mut zero_width = sample();
        zero_width.layer_sizes = vec![2, 0];

        let mut bad_rate = sample();
        bad_rate.learning_rate = -1.0;

        let mut overflowing = sample();
        overflowing.layer_sizes = vec![usize::MAX, 2];

        let mut huge_declared = sample();
        huge_declared.layer_sizes = vec![2, 1 << 40];

        let cases = [
            missing_layer,
            short_row,
            extra_bias,
            zero_width,
            bad_rate,
            overflowing,
            huge_declared,
        ];
        for snapshot in cases {
            assert!(matches!(
                NeuralNetwork::from_snapshot(snapshot, "x.txt"),
                Err(NetError::CorruptState { .. })
            ));
        }
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["layer_sizes"], serde_json::json!([2, 1]));
        assert_eq!(json["layers"][0]["weights"][0][1], -1.0);
    }
}
