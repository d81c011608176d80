//! Error types for instance construction and feasible-set generation

use thiserror::Error;

/// Errors raised while building or reading knapsack data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed instance: mismatched dimensions, negative weights or capacity
    #[error("Construction error: {0}")]
    Construction(String),

    /// The decision tree produced no feasible selection
    #[error("No feasible selection found for capacity {capacity}")]
    EmptyDistribution { capacity: u64 },

    /// Instance text could not be parsed
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Reading or writing an instance file failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;
