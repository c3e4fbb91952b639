/// Configuration for a [`train`](crate::train::trainer::train) run.
///
/// # Fields
/// - `epochs`: number of full online passes over the samples
/// - `log_every`: emit an `info!` line every this many epochs; `0` disables
///   progress logging (the final epoch is always logged)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub log_every: usize,
}

impl TrainConfig {
    pub fn new(epochs: usize) -> Self {
        TrainConfig { epochs, log_every: 0 }
    }

    pub fn log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }
}
