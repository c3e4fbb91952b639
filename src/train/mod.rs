pub mod trainer;
pub mod epoch_stats;
pub mod train_config;

pub use trainer::{evaluate, train, train_epoch};
pub use epoch_stats::EpochStats;
pub use train_config::TrainConfig;
