use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    /// A configuration value was rejected before any work started.
    InvalidConfig(String),
    /// The operation needs at least one row and got none.
    EmptyDataset,
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A value that must be finite was NaN or infinite.
    NonFiniteValue {
        what: &'static str,
        index: usize,
    },
    /// A bounded batch stream ran dry before the requested steps were taken.
    InsufficientData {
        requested: usize,
        produced: usize,
    },
    /// The parameters stopped being finite after an optimizer step.
    Diverged {
        step: usize,
        weight: f64,
        bias: f64,
    },
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            MlErr::EmptyDataset => write!(f, "the dataset has no rows"),
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch for {what}, got {got} and expected {expected}"
            ),
            MlErr::NonFiniteValue { what, index } => {
                write!(f, "{what} at index {index} is not a finite number")
            }
            MlErr::InsufficientData {
                requested,
                produced,
            } => write!(
                f,
                "insufficient data for requested steps: requested {requested}, the stream produced {produced} batches"
            ),
            MlErr::Diverged { step, weight, bias } => write!(
                f,
                "training diverged at step {step}: weight={weight}, bias={bias}"
            ),
        }
    }
}

impl Error for MlErr {}
