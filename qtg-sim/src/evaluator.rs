//! Backend abstraction for evaluating a bound ansatz
//!
//! Two interchangeable implementations sit behind [`Evaluator`]:
//!
//! - [`StatevectorEvaluator`]: exact expectation from the dense state,
//!   seeded sampling for the final measurement
//! - [`ShotEvaluator`]: expectation estimated as the mean energy of a fixed
//!   number of seeded shots
//!
//! Every call creates its own RNG from the configured seed, so results are
//! reproducible and independent of call order.

use crate::ansatz::AnsatzTemplate;
use crate::error::{Result, SolverError};
use qtg_core::{Bitstring, Instance};
use qtg_state::{ComputationalBasis, CostOperator, DenseState, SamplingResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Measured selections and their counts
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleCounts {
    counts: BTreeMap<Bitstring, usize>,
    shots: usize,
}

impl SampleCounts {
    /// Build from explicit counts; the shot total is their sum
    pub fn from_counts(counts: BTreeMap<Bitstring, usize>) -> Self {
        let shots = counts.values().sum();
        Self { counts, shots }
    }

    fn from_sampling(result: SamplingResult, num_items: usize) -> Self {
        let counts = result
            .counts
            .into_iter()
            .map(|(outcome, count)| (Bitstring::from_index(outcome, num_items), count))
            .collect();
        Self::from_counts(counts)
    }

    /// Total number of shots
    pub fn shots(&self) -> usize {
        self.shots
    }

    pub fn get(&self, bits: &Bitstring) -> usize {
        self.counts.get(bits).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counts in bit-string order
    pub fn iter(&self) -> impl Iterator<Item = (&Bitstring, usize)> {
        self.counts.iter().map(|(b, &c)| (b, c))
    }

    /// Relative frequency of a selection
    pub fn frequency(&self, bits: &Bitstring) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.get(bits) as f64 / self.shots as f64
    }

    /// Fraction of shots that violate the capacity constraint
    pub fn infeasible_fraction(&self, instance: &Instance) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        let bad: usize = self
            .counts
            .iter()
            .filter(|(b, _)| !instance.is_feasible(b))
            .map(|(_, &c)| c)
            .sum();
        bad as f64 / self.shots as f64
    }
}

/// Evaluates bound ansätze for the optimizer and the final measurement
pub trait Evaluator {
    /// Backend name for logs and reports
    fn name(&self) -> &str;

    /// `⟨ψ(params)| H |ψ(params)⟩` for a cost operator of the template's width
    fn expectation(&self, template: &AnsatzTemplate, params: &[f64], cost: &CostOperator) -> Result<f64>;

    /// Measure the active item qubits `shots` times
    fn sample(&self, template: &AnsatzTemplate, params: &[f64], shots: usize) -> Result<SampleCounts>;
}

fn check_cost_width(template: &AnsatzTemplate, cost: &CostOperator) -> Result<()> {
    if cost.width() != template.width() {
        return Err(SolverError::Simulation(format!(
            "Cost operator width {} does not match ansatz width {}",
            cost.width(),
            template.width()
        )));
    }
    Ok(())
}

fn sample_state(state: &DenseState, num_items: usize, shots: usize, seed: u64) -> Result<SampleCounts> {
    if shots == 0 {
        return Err(SolverError::Simulation("Sampling requires at least one shot".into()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let result = ComputationalBasis::leading(num_items).sample(state, shots, &mut || rng.gen::<f64>())?;
    let counts = SampleCounts::from_sampling(result, num_items);
    if counts.shots() == 0 {
        return Err(SolverError::Simulation("Sampling returned no counts".into()));
    }
    Ok(counts)
}

/// Exact state-vector evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatevectorEvaluator {
    seed: u64,
}

impl StatevectorEvaluator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Exact measurement distribution over the active item qubits
    pub fn probabilities(&self, template: &AnsatzTemplate, params: &[f64]) -> Result<BTreeMap<Bitstring, f64>> {
        let state = template.bind(params)?.prepare()?;
        let n = template.num_items();
        Ok(ComputationalBasis::leading(n)
            .probabilities(&state)?
            .into_iter()
            .map(|(outcome, p)| (Bitstring::from_index(outcome, n), p))
            .collect())
    }
}

impl Default for StatevectorEvaluator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Evaluator for StatevectorEvaluator {
    fn name(&self) -> &str {
        "statevector"
    }

    fn expectation(&self, template: &AnsatzTemplate, params: &[f64], cost: &CostOperator) -> Result<f64> {
        check_cost_width(template, cost)?;
        let state = template.bind(params)?.prepare()?;
        if cost == template.cost() {
            Ok(state.expectation_value(template.diagonal())?)
        } else {
            Ok(cost.expectation_value(&state)?)
        }
    }

    fn sample(&self, template: &AnsatzTemplate, params: &[f64], shots: usize) -> Result<SampleCounts> {
        let state = template.bind(params)?.prepare()?;
        sample_state(&state, template.num_items(), shots, self.seed)
    }
}

/// Shot-based evaluation
///
/// Every call samples with the same seed, so repeated evaluations at equal
/// parameters return equal estimates and the optimizer sees a deterministic
/// objective rather than fresh shot noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotEvaluator {
    shots: usize,
    seed: u64,
}

impl ShotEvaluator {
    /// Estimate expectations from `shots` samples
    ///
    /// # Errors
    /// Returns a construction error if `shots` is 0
    pub fn new(shots: usize, seed: u64) -> Result<Self> {
        if shots == 0 {
            return Err(SolverError::Construction(
                "Shot evaluator needs at least one shot".into(),
            ));
        }
        Ok(Self { shots, seed })
    }

    pub fn shots(&self) -> usize {
        self.shots
    }
}

impl Evaluator for ShotEvaluator {
    fn name(&self) -> &str {
        "shots"
    }

    fn expectation(&self, template: &AnsatzTemplate, params: &[f64], cost: &CostOperator) -> Result<f64> {
        check_cost_width(template, cost)?;
        let counts = self.sample(template, params, self.shots)?;
        let total: f64 = counts
            .iter()
            .map(|(bits, c)| cost.energy_of(bits) * c as f64)
            .sum();
        Ok(total / counts.shots() as f64)
    }

    fn sample(&self, template: &AnsatzTemplate, params: &[f64], shots: usize) -> Result<SampleCounts> {
        let state = template.bind(params)?.prepare()?;
        sample_state(&state, template.num_items(), shots, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prep::StatePreparer;
    use approx::assert_relative_eq;
    use qtg_core::FeasibleDistributionGenerator;
    use std::sync::Arc;

    fn setup() -> (Instance, AnsatzTemplate) {
        let profits = vec![vec![10, 0, 0], vec![0, 20, 0], vec![0, 0, 30]];
        let instance = Instance::new(3, profits, vec![2, 3, 4], 5).unwrap();
        let dist = FeasibleDistributionGenerator::for_instance(&instance)
            .generate()
            .unwrap();
        let prep = Arc::new(StatePreparer::new(&dist, false).unwrap());
        let cost = Arc::new(CostOperator::from_instance(&instance));
        let template = AnsatzTemplate::new(cost, prep, 1).unwrap();
        (instance, template)
    }

    #[test]
    fn test_exact_expectation_at_zero_angles() {
        let (instance, template) = setup();
        let eval = StatevectorEvaluator::new(1);
        let e = eval.expectation(&template, &[0.0, 0.0], template.cost()).unwrap();
        // -(0.125·0 + 0.25·10 + 0.25·20 + 0.125·30 + 0.25·30)
        assert_relative_eq!(e, -18.75, epsilon = 1e-10);

        let probs = eval.probabilities(&template, &[0.0, 0.0]).unwrap();
        for (bits, p) in &probs {
            if *p > 1e-20 {
                assert!(instance.is_feasible(bits));
            }
        }
    }

    #[test]
    fn test_sampling_is_seeded() {
        let (_, template) = setup();
        let eval = StatevectorEvaluator::new(42);
        let a = eval.sample(&template, &[0.4, 1.1], 500).unwrap();
        let b = eval.sample(&template, &[0.4, 1.1], 500).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shots(), 500);
        assert_eq!(a.iter().map(|(_, c)| c).sum::<usize>(), 500);
    }

    #[test]
    fn test_shot_estimate_is_close() {
        let (_, template) = setup();
        let exact = StatevectorEvaluator::new(0)
            .expectation(&template, &[0.3, 0.8], template.cost())
            .unwrap();
        let shots = ShotEvaluator::new(20_000, 5).unwrap();
        let estimate = shots.expectation(&template, &[0.3, 0.8], template.cost()).unwrap();
        assert!((estimate - exact).abs() < 0.5, "{} vs {}", estimate, exact);
    }

    #[test]
    fn test_shot_estimate_is_repeatable() {
        let (_, template) = setup();
        let shots = ShotEvaluator::new(64, 11).unwrap();
        let a = shots.expectation(&template, &[1.2, 0.5], template.cost()).unwrap();
        let b = shots.expectation(&template, &[1.2, 0.5], template.cost()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_errors() {
        let (_, template) = setup();
        let eval = StatevectorEvaluator::new(0);
        assert!(matches!(
            eval.sample(&template, &[0.0, 0.0], 0),
            Err(SolverError::Simulation(_))
        ));
        assert!(matches!(
            eval.expectation(&template, &[0.0], template.cost()),
            Err(SolverError::Simulation(_))
        ));
        let wide = template.cost().extend(4).unwrap();
        assert!(matches!(
            eval.expectation(&template, &[0.0, 0.0], &wide),
            Err(SolverError::Simulation(_))
        ));
        assert!(ShotEvaluator::new(0, 1).is_err());
    }
}
