//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Two-qubit operation addressed the same qubit twice
    #[error("Duplicate qubit {qubit} in two-qubit operation")]
    DuplicateQubit { qubit: usize },

    /// Invalid state dimension
    #[error("Invalid state dimension {dimension}, expected power of 2")]
    InvalidDimension { dimension: usize },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Probabilities cannot be sampled (empty, negative or all zero)
    #[error("Invalid probability distribution: {reason}")]
    InvalidDistribution { reason: String },
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
