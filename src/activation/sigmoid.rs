use std::f64::consts::E;

/// Magnitude returned by [`Sigmoid::inverse`] when the activation is saturated
/// at (or beyond) 0 or 1 and the logit would otherwise be infinite.
pub const NET_INPUT_BOUND: f64 = 99999.0;

/// The logistic sigmoid, the only activation this network uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sigmoid;

impl Sigmoid {
    /// σ(x) = 1 / (1 + e^-x)
    pub fn function(x: f64) -> f64 {
        1.0 / (1.0 + E.powf(-x))
    }

    /// σ'(x) = σ(x)·(1 − σ(x)), evaluated at the pre-activation value `x`.
    pub fn derivative(x: f64) -> f64 {
        let fx = Sigmoid::function(x);
        fx * (1.0 - fx)
    }

    /// Recovers the pre-activation value from a stored activation:
    /// σ⁻¹(a) = −ln(1/a − 1).
    ///
    /// Saturated activations (`a <= 0`, `a >= 1`, or close enough to either that
    /// the logit overflows) map to `∓NET_INPUT_BOUND` instead of `±inf`/`NaN`.
    pub fn inverse(a: f64) -> f64 {
        if a.is_nan() {
            return 0.0;
        }
        if a <= 0.0 {
            return -NET_INPUT_BOUND;
        }
        if a >= 1.0 {
            return NET_INPUT_BOUND;
        }
        let net = -(1.0 / a - 1.0).ln();
        if net.is_finite() {
            net.clamp(-NET_INPUT_BOUND, NET_INPUT_BOUND)
        } else if net > 0.0 {
            NET_INPUT_BOUND
        } else {
            -NET_INPUT_BOUND
        }
    }
}
