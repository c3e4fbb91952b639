/// Summed squared error, the loss the backward pass differentiates.
pub struct SquaredError;

impl SquaredError {
    /// Scalar loss: Σ (predicted − expected)²
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }

    /// ∂loss/∂predicted for a single output node: 2·(predicted − expected)
    pub fn gradient(predicted: f64, expected: f64) -> f64 {
        2.0 * (predicted - expected)
    }
}
