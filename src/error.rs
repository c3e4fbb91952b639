use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Everything that can go wrong while building, running or persisting a network.
#[derive(Debug)]
pub enum NetError {
    /// Fewer than two layers, or a layer with zero nodes.
    InvalidTopology { layer_sizes: Vec<usize> },
    /// An input or target vector does not match the declared layer width.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A persisted representation could not be turned back into a network.
    CorruptState { reason: String },
    /// A hyperparameter (learning rate, initialization range) is unusable.
    InvalidConfig { reason: String },
    /// The underlying storage could not be read or written.
    Io(io::Error),
}

impl NetError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        NetError::CorruptState {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        NetError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::InvalidTopology { layer_sizes } => write!(
                f,
                "invalid topology {layer_sizes:?}: need at least 2 non-empty layers \
                 whose buffer sizes fit in memory"
            ),
            NetError::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "dimension mismatch for {what}: got {got} values, expected {expected}"
            ),
            NetError::CorruptState { reason } => write!(f, "corrupt network state: {reason}"),
            NetError::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
            NetError::Io(e) => write!(f, "i/o failure: {e}"),
        }
    }
}

impl Error for NetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NetError {
    fn from(e: io::Error) -> Self {
        NetError::Io(e)
    }
}
