//! Error types for the solver pipeline

use qtg_state::StateError;
use thiserror::Error;

/// Result type for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors that abort a solve
///
/// Every variant is fatal to the current solve; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Malformed input to one of the builders
    #[error("Construction error: {0}")]
    Construction(String),

    /// The decision tree produced no feasible selection
    #[error("No feasible selection found for capacity {capacity}")]
    EmptyDistribution { capacity: u64 },

    /// The evaluator could not produce a value or samples
    #[error("Simulation error: {0}")]
    Simulation(String),

    /// The optimizer failed or did not converge
    #[error("Optimization error: {0}")]
    Optimization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<qtg_core::Error> for SolverError {
    fn from(err: qtg_core::Error) -> Self {
        match err {
            qtg_core::Error::Construction(msg) => SolverError::Construction(msg),
            qtg_core::Error::EmptyDistribution { capacity } => {
                SolverError::EmptyDistribution { capacity }
            }
            qtg_core::Error::Io(msg) => SolverError::Io(msg),
            parse @ qtg_core::Error::Parse { .. } => SolverError::Construction(parse.to_string()),
        }
    }
}

impl From<StateError> for SolverError {
    fn from(err: StateError) -> Self {
        SolverError::Simulation(err.to_string())
    }
}

impl From<std::io::Error> for SolverError {
    fn from(err: std::io::Error) -> Self {
        SolverError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for SolverError {
    fn from(err: serde_yaml::Error) -> Self {
        SolverError::Config(err.to_string())
    }
}
