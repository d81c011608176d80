//! Solver configuration
//!
//! Configuration is assembled from the following sources (later sources
//! override earlier ones):
//!
//! 1. Built-in defaults or a preset ([`SolverConfig::fast`],
//!    [`SolverConfig::accurate`])
//! 2. A YAML file
//! 3. Environment variables (`QTG_*`)
//! 4. CLI arguments

use crate::error::{Result, SolverError};
use crate::mixer::MixerKind;
use crate::optimizer::NelderMeadConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which evaluator drives the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Exact expectation values from the dense state
    Statevector,
    /// Expectation values estimated from `shots` samples
    Shots,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Statevector => write!(f, "statevector"),
            Backend::Shots => write!(f, "shots"),
        }
    }
}

impl FromStr for Backend {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "statevector" => Ok(Backend::Statevector),
            "shots" => Ok(Backend::Shots),
            other => Err(SolverError::Config(format!("Unknown backend {:?}", other))),
        }
    }
}

/// Configuration of one QTG-QAOA solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Number of QAOA layers `p`
    ///
    /// Default: 3
    pub layers: usize,

    /// Shots for the final measurement (and for expectation estimates with
    /// the shot backend)
    ///
    /// Default: 1000
    pub shots: usize,

    /// Evaluator used during optimization
    ///
    /// Default: statevector
    pub backend: Backend,

    /// Mixer of every layer
    ///
    /// Default: qtg
    pub mixer: MixerKind,

    /// Optimizer tolerance on simplex radius and value spread
    ///
    /// Default: 1e-5
    pub tolerance: f64,

    /// Optimizer iteration cap
    ///
    /// Default: 2000
    pub max_iterations: usize,

    /// Offset of the initial simplex vertices
    ///
    /// Default: 0.5
    pub initial_step: f64,

    /// Accept the best point when the iteration cap is reached
    ///
    /// Default: false
    pub allow_unconverged: bool,

    /// Starting `γ` for every layer
    ///
    /// Default: π
    pub initial_gamma: f64,

    /// Starting `β` for every layer
    ///
    /// Default: π/2
    pub initial_beta: f64,

    /// Give every feasible selection the same initial weight
    ///
    /// Default: false
    pub uniform: bool,

    /// Bias toward the greedy solution, per item; the tree bias strength is
    /// `bias_per_item · n`, and 0 disables biasing
    ///
    /// Default: 0.0
    pub bias_per_item: f64,

    /// Seed for every random draw of the evaluators
    ///
    /// Default: 42
    pub seed: u64,

    /// Warn when the measured infeasible fraction exceeds this
    ///
    /// Default: 1e-6
    pub leakage_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            layers: 3,
            shots: 1000,
            backend: Backend::Statevector,
            mixer: MixerKind::Qtg,
            tolerance: 1e-5,
            max_iterations: 2000,
            initial_step: 0.5,
            allow_unconverged: false,
            initial_gamma: PI,
            initial_beta: FRAC_PI_2,
            uniform: false,
            bias_per_item: 0.0,
            seed: 42,
            leakage_tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration optimized for speed
    ///
    /// - Single layer
    /// - Fewer shots and a looser tolerance
    pub fn fast() -> Self {
        Self {
            layers: 1,
            shots: 256,
            tolerance: 1e-4,
            max_iterations: 500,
            allow_unconverged: true,
            ..Default::default()
        }
    }

    /// Create a configuration optimized for accuracy
    ///
    /// - Deeper ansatz
    /// - More shots and a tighter tolerance
    pub fn accurate() -> Self {
        Self {
            layers: 5,
            shots: 10000,
            tolerance: 1e-6,
            max_iterations: 5000,
            ..Default::default()
        }
    }

    /// Set the number of layers
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    /// Set the number of measurement shots
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    /// Set the evaluator backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the mixer
    pub fn with_mixer(mut self, mixer: MixerKind) -> Self {
        self.mixer = mixer;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the greedy bias per item
    pub fn with_bias_per_item(mut self, bias: f64) -> Self {
        self.bias_per_item = bias;
        self
    }

    /// Load configuration from an optional YAML file and the environment
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be read, or a configuration
    /// error if it does not parse or the result is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::from_yaml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `QTG_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }
        fn flag(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
            lookup(key).map(|v| v.to_lowercase() == "true" || v == "1")
        }

        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
        if let Some(v) = parsed(lookup, "QTG_LAYERS") {
            self.layers = v;
        }
        if let Some(v) = parsed(lookup, "QTG_SHOTS") {
            self.shots = v;
        }
        if let Some(v) = parsed(lookup, "QTG_BACKEND") {
            self.backend = v;
        }
        if let Some(v) = parsed(lookup, "QTG_MIXER") {
            self.mixer = v;
        }
        if let Some(v) = parsed(lookup, "QTG_TOLERANCE") {
            self.tolerance = v;
        }
        if let Some(v) = parsed(lookup, "QTG_MAX_ITERATIONS") {
            self.max_iterations = v;
        }
        if let Some(v) = parsed(lookup, "QTG_SEED") {
            self.seed = v;
        }
        if let Some(v) = parsed(lookup, "QTG_BIAS_PER_ITEM") {
            self.bias_per_item = v;
        }
        if let Some(v) = flag(lookup, "QTG_UNIFORM") {
            self.uniform = v;
        }
        if let Some(v) = flag(lookup, "QTG_ALLOW_UNCONVERGED") {
            self.allow_unconverged = v;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.layers == 0 {
            return Err(SolverError::Config("layers must be > 0".into()));
        }
        if self.shots == 0 {
            return Err(SolverError::Config("shots must be > 0".into()));
        }
        if !(self.tolerance > 0.0) {
            return Err(SolverError::Config(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::Config("max_iterations must be > 0".into()));
        }
        if !(self.initial_step.is_finite() && self.initial_step != 0.0) {
            return Err(SolverError::Config(format!(
                "initial_step must be finite and non-zero, got {}",
                self.initial_step
            )));
        }
        if !(self.initial_gamma.is_finite() && self.initial_beta.is_finite()) {
            return Err(SolverError::Config("initial angles must be finite".into()));
        }
        if !(self.bias_per_item.is_finite() && self.bias_per_item >= 0.0) {
            return Err(SolverError::Config(format!(
                "bias_per_item must be non-negative, got {}",
                self.bias_per_item
            )));
        }
        if !(0.0..=1.0).contains(&self.leakage_tolerance) {
            return Err(SolverError::Config(format!(
                "leakage_tolerance must be in [0,1], got {}",
                self.leakage_tolerance
            )));
        }
        Ok(())
    }

    /// Optimizer settings derived from this configuration
    pub fn optimizer_config(&self) -> NelderMeadConfig {
        NelderMeadConfig {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            initial_step: self.initial_step,
            allow_unconverged: self.allow_unconverged,
            ..Default::default()
        }
    }
}
