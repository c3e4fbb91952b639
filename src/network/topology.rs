use std::ops::Range;

use crate::error::{NetError, Result};

/// Validated layer widths plus the offsets that locate each layer inside the
/// network's flat activation, weight and bias buffers.
///
/// Layout:
/// - activations: layer 0 first, `node_offsets[l]..node_offsets[l + 1]`
/// - biases: layers 1.., shifted down by the input width
/// - weights: layers 1.., node-major, each row `sizes[l - 1]` long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    sizes: Vec<usize>,
    node_offsets: Vec<usize>,
    weight_offsets: Vec<usize>,
}

impl Topology {
    /// Fails with `InvalidTopology` for fewer than two layers or any empty layer.
    pub fn new(layer_sizes: &[usize]) -> Result<Topology> {
        if layer_sizes.len() < 2 || layer_sizes.contains(&0) {
            return Err(NetError::InvalidTopology {
                layer_sizes: layer_sizes.to_vec(),
            });
        }

        let overflow = || NetError::InvalidTopology {
            layer_sizes: layer_sizes.to_vec(),
        };

        let mut node_offsets = Vec::with_capacity(layer_sizes.len() + 1);
        let mut total: usize = 0;
        node_offsets.push(0);
        for &size in layer_sizes {
            total = total.checked_add(size).ok_or_else(overflow)?;
            node_offsets.push(total);
        }

        // weight_offsets[0] is a placeholder so that layer l maps to index l
        let mut weight_offsets = Vec::with_capacity(layer_sizes.len() + 1);
        let mut total: usize = 0;
        weight_offsets.push(0);
        weight_offsets.push(0);
        for pair in layer_sizes.windows(2) {
            let connections = pair[0].checked_mul(pair[1]).ok_or_else(overflow)?;
            total = total.checked_add(connections).ok_or_else(overflow)?;
            weight_offsets.push(total);
        }

        Ok(Topology {
            sizes: layer_sizes.to_vec(),
            node_offsets,
            weight_offsets,
        })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn layer_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn width(&self, layer: usize) -> usize {
        self.sizes[layer]
    }

    pub fn input_width(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_width(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    pub fn output_layer(&self) -> usize {
        self.sizes.len() - 1
    }

    /// Length of the activation buffer (every node of every layer).
    pub fn node_count(&self) -> usize {
        self.node_offsets[self.sizes.len()]
    }

    /// Length of the bias buffer (every node except the inputs).
    pub fn bias_count(&self) -> usize {
        self.node_count() - self.input_width()
    }

    pub fn weight_count(&self) -> usize {
        self.weight_offsets[self.sizes.len()]
    }

    /// Slice of the activation buffer holding `layer`.
    pub fn layer_range(&self, layer: usize) -> Range<usize> {
        self.node_offsets[layer]..self.node_offsets[layer + 1]
    }

    pub fn node_index(&self, layer: usize, node: usize) -> usize {
        debug_assert!(node < self.sizes[layer]);
        self.node_offsets[layer] + node
    }

    /// `layer` must be at least 1.
    pub fn bias_index(&self, layer: usize, node: usize) -> usize {
        debug_assert!(layer >= 1 && node < self.sizes[layer]);
        self.node_offsets[layer] - self.sizes[0] + node
    }

    /// Slice of the bias buffer holding `layer` (`layer >= 1`).
    pub fn bias_range(&self, layer: usize) -> Range<usize> {
        let start = self.bias_index(layer, 0);
        start..start + self.sizes[layer]
    }

    /// Slice of the weight buffer holding the incoming weights of one node.
    pub fn weight_row(&self, layer: usize, node: usize) -> Range<usize> {
        debug_assert!(layer >= 1 && node < self.sizes[layer]);
        let fan_in = self.sizes[layer - 1];
        let start = self.weight_offsets[layer] + node * fan_in;
        start..start + fan_in
    }

    pub fn weight_index(&self, layer: usize, node: usize, prev_node: usize) -> usize {
        debug_assert!(prev_node < self.sizes[layer - 1]);
        self.weight_row(layer, node).start + prev_node
    }
}
