pub mod backprop;
pub mod network;
pub mod persist;
pub mod snapshot;
pub mod spec;
pub mod topology;

pub use network::{NeuralNetwork, RunMode, DEFAULT_LEARNING_RATE};
pub use snapshot::{LayerSnapshot, NetworkSnapshot};
pub use spec::NetworkSpec;
pub use topology::Topology;
