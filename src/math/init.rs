use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

/// Symmetric range fresh weights and biases are drawn from.
pub const DEFAULT_INIT_BOUND: f64 = 0.5;

/// Uniform initialization over the closed range `[min, max]`.
///
/// Every call to [`UniformInit::fill`] draws each value independently from the
/// caller's random source, so seeding that source makes construction reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformInit {
    pub min: f64,
    pub max: f64,
}

impl Default for UniformInit {
    fn default() -> Self {
        UniformInit { min: -DEFAULT_INIT_BOUND, max: DEFAULT_INIT_BOUND }
    }
}

impl UniformInit {
    pub fn new(min: f64, max: f64) -> Result<UniformInit> {
        let init = UniformInit { min, max };
        init.validate()?;
        Ok(init)
    }

    /// Both bounds and the width `max - min` must be finite, since sampling
    /// scales by the width.
    pub fn validate(&self) -> Result<()> {
        let width = self.max - self.min;
        if !self.min.is_finite() || !self.max.is_finite() || !width.is_finite() || width < 0.0 {
            return Err(NetError::config(format!(
                "initialization range [{}, {}] is empty or not finite",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }

    /// Overwrites every element of `buf` with an independent draw.
    pub fn fill<R: Rng + ?Sized>(&self, buf: &mut [f64], rng: &mut R) {
        for x in buf.iter_mut() {
            *x = self.sample(rng);
        }
    }
}
