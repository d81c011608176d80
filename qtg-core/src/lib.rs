//! Quadratic knapsack data model and feasible-set generation
//!
//! This crate holds everything about the problem that is independent of the
//! quantum simulation:
//!
//! - [`Instance`] and [`Bitstring`]: validated problem data and selections
//! - [`FeasibleDistributionGenerator`]: the capacity-aware decision tree that
//!   weights every feasible selection
//! - [`classical`]: greedy and exhaustive reference solvers
//! - [`io`] and [`generator`]: instance files and seeded random instances
//!
//! # Example
//!
//! ```
//! use qtg_core::{Instance, FeasibleDistributionGenerator};
//!
//! let profits = vec![vec![10, 0, 0], vec![0, 20, 0], vec![0, 0, 30]];
//! let instance = Instance::new(3, profits, vec![2, 3, 4], 5).unwrap();
//!
//! let dist = FeasibleDistributionGenerator::for_instance(&instance)
//!     .generate()
//!     .unwrap();
//! assert!(dist.is_feasible_for(&instance));
//! ```

pub mod bitstring;
pub mod classical;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod instance;
pub mod io;
pub mod tree;

pub use bitstring::Bitstring;
pub use classical::{exhaustive, greedy_deletion, relative_gap, ClassicalSolution};
pub use distribution::FeasibleDistribution;
pub use error::{Error, Result};
pub use generator::{generate_instance, GeneratorConfig};
pub use instance::{check_profit_matrix, Instance};
pub use io::{format_instance, parse_instance, read_instance, write_instance, InstanceFile};
pub use tree::{FeasibleDistributionGenerator, FeasibleTree, TreeBias, TreeNode};
