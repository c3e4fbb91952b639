use crate::activation::Sigmoid;
use crate::loss::SquaredError;
use crate::network::network::NeuralNetwork;

impl NeuralNetwork {
    /// One stochastic gradient step on the squared error of the last forward
    /// pass against `expected`. `expected` must already match the output width.
    ///
    /// Layers are processed from the output down and each one is updated as
    /// soon as its deltas are known. A hidden layer therefore propagates its
    /// error through the already-updated weights of the layer above it.
    pub(crate) fn backpropagate(&mut self, expected: &[f64]) {
        let topology = &self.topology;
        let output_layer = topology.output_layer();
        let lr = self.learning_rate;

        // TODO: compute every delta before updating (exact gradient) and cache the
        // raw sums in `forward` instead of inverting the sigmoid.
        for layer in (1..=output_layer).rev() {
            for node in 0..topology.width(layer) {
                let a = self.activations[topology.node_index(layer, node)];
                // The pre-activation sum is recovered from the activation. Saturated
                // nodes hit the clamp in `Sigmoid::inverse` and get a zero derivative.
                let d = Sigmoid::derivative(Sigmoid::inverse(a));

                let error = if layer == output_layer {
                    SquaredError::gradient(a, expected[node])
                } else {
                    (0..topology.width(layer + 1))
                        .map(|next| {
                            self.weights[topology.weight_index(layer + 1, next, node)]
                                * self.deltas[topology.node_index(layer + 1, next)]
                        })
                        .sum::<f64>()
                };

                self.deltas[topology.node_index(layer, node)] = d * error;
            }

            let prev = &self.activations[topology.layer_range(layer - 1)];
            for node in 0..topology.width(layer) {
                let delta = self.deltas[topology.node_index(layer, node)];
                for (w, a) in self.weights[topology.weight_row(layer, node)].iter_mut().zip(prev) {
                    *w -= lr * a * delta;
                }
                self.biases[topology.bias_index(layer, node)] -= lr * delta;
            }
        }
    }
}
