pub mod math;
pub mod activation;
pub mod error;
pub mod network;
pub mod loss;
pub mod train;

// Convenience re-exports
pub use activation::sigmoid::Sigmoid;
pub use error::{NetError, Result};
pub use math::init::UniformInit;
pub use network::network::{NeuralNetwork, RunMode, DEFAULT_LEARNING_RATE};
pub use network::snapshot::{LayerSnapshot, NetworkSnapshot};
pub use network::spec::NetworkSpec;
pub use network::topology::Topology;
pub use loss::squared_error::SquaredError;
pub use train::{evaluate, train, train_epoch, EpochStats, TrainConfig};
