//! Computational basis sampling
//!
//! Multi-shot sampling uses Walker's alias method: O(2^n) setup, then O(1)
//! per shot. Randomness is injected as a `FnMut() -> f64` returning values in
//! `[0, 1)`, so callers decide how the generator is seeded.

use crate::dense_state::DenseState;
use crate::error::{Result, StateError};
use std::collections::BTreeMap;

/// Counts from multiple measurement shots
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingResult {
    /// Map from measured outcome (packed measured qubits) to count
    pub counts: BTreeMap<u64, usize>,

    /// Total number of shots
    pub shots: usize,
}

impl SamplingResult {
    /// Create an empty result
    pub fn new(shots: usize) -> Self {
        Self {
            counts: BTreeMap::new(),
            shots,
        }
    }

    /// Add a measurement outcome
    pub fn add_outcome(&mut self, outcome: u64) {
        *self.counts.entry(outcome).or_insert(0) += 1;
    }

    /// Get the count for a specific outcome
    pub fn get_count(&self, outcome: u64) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Get the probability of an outcome (count / shots)
    pub fn get_probability(&self, outcome: u64) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.get_count(outcome) as f64 / self.shots as f64
    }

    /// Sum of all counts
    pub fn total_counts(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Computational basis measurement of a subset of qubits
///
/// Measured qubit `qubits[k]` becomes bit `k` of the reported outcome.
#[derive(Debug, Clone)]
pub struct ComputationalBasis {
    qubits: Option<Vec<usize>>,
}

impl ComputationalBasis {
    /// Measure every qubit
    pub fn new() -> Self {
        Self { qubits: None }
    }

    /// Measure only the listed qubits
    pub fn of_qubits(qubits: Vec<usize>) -> Self {
        Self {
            qubits: Some(qubits),
        }
    }

    /// Measure qubits `0..count`
    pub fn leading(count: usize) -> Self {
        Self::of_qubits((0..count).collect())
    }

    fn project(&self, index: usize) -> u64 {
        match &self.qubits {
            None => index as u64,
            Some(qubits) => qubits
                .iter()
                .enumerate()
                .fold(0u64, |acc, (k, &q)| acc | ((((index >> q) & 1) as u64) << k)),
        }
    }

    fn check(&self, state: &DenseState) -> Result<()> {
        if let Some(qubits) = &self.qubits {
            if let Some(&bad) = qubits.iter().find(|&&q| q >= state.num_qubits()) {
                return Err(StateError::InvalidQubitIndex {
                    index: bad,
                    num_qubits: state.num_qubits(),
                });
            }
        }
        Ok(())
    }

    /// Marginal probability of every outcome with non-zero mass
    ///
    /// # Errors
    /// Returns error if a measured qubit is outside the register
    pub fn probabilities(&self, state: &DenseState) -> Result<BTreeMap<u64, f64>> {
        self.check(state)?;
        let mut marginal = BTreeMap::new();
        for (index, p) in state.get_all_probabilities().into_iter().enumerate() {
            if p > 0.0 {
                *marginal.entry(self.project(index)).or_insert(0.0) += p;
            }
        }
        Ok(marginal)
    }

    /// Draw `shots` samples without disturbing the state
    ///
    /// # Errors
    /// Returns error if a measured qubit is outside the register or the state
    /// has no probability mass
    pub fn sample(
        &self,
        state: &DenseState,
        shots: usize,
        rng: &mut dyn FnMut() -> f64,
    ) -> Result<SamplingResult> {
        self.check(state)?;
        if shots == 0 {
            return Ok(SamplingResult::new(0));
        }

        let probabilities = state.get_all_probabilities();
        let alias_table = AliasTable::new(&probabilities)?;

        let mut result = SamplingResult::new(shots);
        for _ in 0..shots {
            let index = alias_table.sample(rng);
            result.add_outcome(self.project(index));
        }
        Ok(result)
    }
}

impl Default for ComputationalBasis {
    fn default() -> Self {
        Self::new()
    }
}

/// Alias table for O(1) sampling from a discrete distribution
///
/// Reference: Walker, A. J. (1977). "An Efficient Method for Generating
/// Discrete Random Variables with General Distributions"
#[derive(Debug, Clone)]
pub struct AliasTable {
    prob: Vec<f64>,
    alias: Vec<usize>,
}

impl AliasTable {
    /// Build a table from non-negative weights (normalized internally)
    ///
    /// # Errors
    /// Returns error if the weights are empty, negative, non-finite or sum to
    /// zero
    pub fn new(weights: &[f64]) -> Result<Self> {
        let n = weights.len();
        if n == 0 {
            return Err(StateError::InvalidDistribution {
                reason: "no outcomes".into(),
            });
        }
        if weights.iter().any(|&w| !w.is_finite() || w < 0.0) {
            return Err(StateError::InvalidDistribution {
                reason: "weights must be finite and non-negative".into(),
            });
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(StateError::InvalidDistribution {
                reason: "total probability is zero".into(),
            });
        }

        let mut prob = vec![0.0; n];
        let mut alias = vec![0; n];

        let mut scaled: Vec<f64> = weights.iter().map(|&w| w / total * n as f64).collect();

        let mut small = Vec::new();
        let mut large = Vec::new();
        for (i, &p) in scaled.iter().enumerate() {
            if p < 1.0 {
                small.push(i);
            } else {
                large.push(i);
            }
        }

        while !small.is_empty() && !large.is_empty() {
            let (Some(s), Some(l)) = (small.pop(), large.pop()) else {
                break;
            };
            prob[s] = scaled[s];
            alias[s] = l;

            scaled[l] = (scaled[l] + scaled[s]) - 1.0;
            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // leftovers are 1 up to rounding; zero-weight entries must never be
        // drawn directly
        for l in large {
            prob[l] = 1.0;
        }
        for s in small {
            if weights[s] > 0.0 {
                prob[s] = 1.0;
            } else {
                prob[s] = 0.0;
                alias[s] = weights.iter().position(|&w| w > 0.0).unwrap_or(s);
            }
        }

        Ok(Self { prob, alias })
    }

    /// Number of outcomes
    pub fn len(&self) -> usize {
        self.prob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Sample an index in O(1)
    pub fn sample(&self, rng: &mut dyn FnMut() -> f64) -> usize {
        let n = self.prob.len();
        let i = ((rng() * n as f64) as usize).min(n - 1);

        if rng() < self.prob[i] {
            i
        } else {
            self.alias[i]
        }
    }
}
