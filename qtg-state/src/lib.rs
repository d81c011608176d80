//! Dense state-vector simulation and the knapsack cost operator
//!
//! - [`DenseState`]: full `2^n` amplitude vector with the handful of
//!   operations the QTG ansatz needs (prefix-controlled rotations, diagonal
//!   phases, zero-projector phases, XY pair rotations)
//! - [`ComputationalBasis`] / [`AliasTable`]: seeded multi-shot sampling
//! - [`CostOperator`]: the objective as a sparse sum of `Z` and `ZZ` terms
//!
//! # Example
//!
//! ```
//! use qtg_core::Instance;
//! use qtg_state::{CostOperator, DenseState};
//!
//! let profits = vec![vec![10, 0], vec![0, 20]];
//! let instance = Instance::new(2, profits, vec![1, 1], 1).unwrap();
//! let cost = CostOperator::from_instance(&instance);
//!
//! // |00⟩ is the empty knapsack with value 0
//! let state = DenseState::new(2).unwrap();
//! assert!(cost.expectation_value(&state).unwrap().abs() < 1e-12);
//! ```

pub mod cost;
pub mod dense_state;
pub mod error;
pub mod kernels;
pub mod measurement;

pub use cost::{CostOperator, ZTerm, COEFFICIENT_CUTOFF};
pub use dense_state::{DenseState, MAX_QUBITS};
pub use error::{Result, StateError};
pub use measurement::{AliasTable, ComputationalBasis, SamplingResult};
