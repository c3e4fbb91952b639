use serde::{Deserialize, Serialize};

/// Summary of one completed training epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean cost over the epoch, each sample measured before its own update.
    pub mean_cost: f64,
    pub elapsed_ms: u64,
}
