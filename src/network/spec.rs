use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use crate::math::init::UniformInit;
use crate::network::network::{NeuralNetwork, DEFAULT_LEARNING_RATE};

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

/// A serializable description of a network to build.
///
/// Only `layer_sizes` is required in JSON; everything else falls back to the
/// defaults a fresh network would get:
///
/// ```json
/// { "name": "xor", "layer_sizes": [2, 4, 1], "learning_rate": 0.5, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// File stem for the network's identity; random when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Node count per layer, input first.
    pub layer_sizes: Vec<usize>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Range fresh weights and biases are drawn from.
    #[serde(default)]
    pub init: UniformInit,
    /// Seed for reproducible initialization; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn new(layer_sizes: Vec<usize>) -> NetworkSpec {
        NetworkSpec {
            name: None,
            layer_sizes,
            learning_rate: DEFAULT_LEARNING_RATE,
            init: UniformInit::default(),
            seed: None,
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Builds a fresh network from this spec.
    pub fn build(&self) -> Result<NeuralNetwork> {
        let mut network = NeuralNetwork::random(
            &self.layer_sizes,
            self.learning_rate,
            self.init,
            &mut self.rng(),
        )?;
        if let Some(name) = &self.name {
            network.identity = PathBuf::from(format!("{name}.txt"));
        }
        Ok(network)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| NetError::Io(e.into()))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                NetError::Io(e.into())
            } else {
                NetError::config(e.to_string())
            }
        })
    }
}

impl NeuralNetwork {
    pub fn from_spec(spec: &NetworkSpec) -> Result<NeuralNetwork> {
        spec.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_gets_defaults() {
        let spec: NetworkSpec = serde_json::from_str(r#"{ "layer_sizes": [3, 4, 2] }"#).unwrap();
        assert_eq!(spec, NetworkSpec::new(vec![3, 4, 2]));
        assert_eq!(spec.init, UniformInit { min: -0.5, max: 0.5 });
    }

    #[test]
    fn seeded_spec_is_reproducible() {
        let spec = NetworkSpec {
            name: Some("digits".into()),
            seed: Some(17),
            ..NetworkSpec::new(vec![4, 3, 2])
        };
        let a = spec.build().unwrap();
        let b = NeuralNetwork::from_spec(&spec).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.identity(), Path::new("digits.txt"));
    }

    #[test]
    fn build_reports_bad_hyperparameters() {
        let mut spec = NetworkSpec::new(vec![2, 1]);
        spec.init = UniformInit { min: 1.0, max: 0.0 };
        assert!(matches!(spec.build(), Err(NetError::InvalidConfig { .. })));

        spec.init = UniformInit { min: -1e308, max: 1e308 };
        assert!(matches!(spec.build(), Err(NetError::InvalidConfig { .. })));

        let spec = NetworkSpec::new(vec![2]);
        assert!(matches!(spec.build(), Err(NetError::InvalidTopology { .. })));
    }
}
