//! QAOA for the quadratic knapsack problem with a quantum tree generator mixer
//!
//! This crate wires the problem model from `qtg-core` and the state-vector
//! simulation from `qtg-state` into a variational solver.
//!
//! # Features
//!
//! - **Feasible state preparation**: the tree distribution compiled into an
//!   exactly invertible rotation tree
//! - **Feasibility-preserving mixer**: `U · e^{-iβ|0⟩⟨0|} · U⁻¹`, with a
//!   pairwise XY mixer as a Hamming-weight preserving alternative
//! - **Late-bound ansatz**: one template, many parameter vectors
//! - **Pluggable evaluators**: exact state vector or seeded shots
//! - **Derivative-free optimization**: Nelder-Mead with progress callbacks
//!
//! # Example
//!
//! ```
//! use qtg_core::Instance;
//! use qtg_sim::{QtgQaoaSolver, SolverConfig};
//!
//! let profits = vec![vec![10, 0, 0], vec![0, 20, 0], vec![0, 0, 30]];
//! let instance = Instance::new(3, profits, vec![2, 3, 4], 5).unwrap();
//!
//! let solver = QtgQaoaSolver::new(SolverConfig::fast()).unwrap();
//! let evaluator = solver.evaluator().unwrap();
//! let solution = solver.solve(&instance, evaluator.as_ref(), None).unwrap();
//! assert!(solution.feasible);
//! ```

pub mod ansatz;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod mixer;
pub mod optimizer;
pub mod prep;
pub mod report;
pub mod solver;

pub use ansatz::{AnsatzTemplate, BoundAnsatz};
pub use config::{Backend, SolverConfig};
pub use error::{Result, SolverError};
pub use evaluator::{Evaluator, SampleCounts, ShotEvaluator, StatevectorEvaluator};
pub use extract::{extract_solution, ExtractedSolution};
pub use mixer::{HammingWeightMixer, Mixer, MixerKind, QtgMixer};
pub use optimizer::{NelderMead, NelderMeadConfig, OptimizationOutcome, OptimizationState};
pub use prep::StatePreparer;
pub use report::{BenchmarkReport, BenchmarkSummary, ResultSink};
pub use solver::{QtgQaoaSolver, Solution};
