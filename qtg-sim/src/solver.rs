//! One QTG-QAOA solve from instance to reported selection
//!
//! The pipeline is all-or-nothing: every builder runs before the first
//! evaluator call, and any error aborts the solve.

use crate::ansatz::AnsatzTemplate;
use crate::config::{Backend, SolverConfig};
use crate::error::Result;
use crate::evaluator::{Evaluator, SampleCounts, ShotEvaluator, StatevectorEvaluator};
use crate::extract::extract_solution;
use crate::optimizer::{NelderMead, OptimizationState};
use crate::prep::StatePreparer;
use qtg_core::{
    greedy_deletion, Bitstring, FeasibleDistribution, FeasibleDistributionGenerator, Instance, TreeBias,
};
use qtg_state::CostOperator;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a solve
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Objective of `selection`, recomputed from the profit matrix
    pub value: i64,
    /// Most frequent measured selection
    pub selection: Bitstring,
    pub feasible: bool,
    /// Optimized `(γ₁..γ_p, β₁..β_p)`
    pub parameters: Vec<f64>,
    /// Cost expectation at `parameters`
    pub expectation: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
    /// Final measurement
    pub counts: SampleCounts,
    /// Share of shots that violated the capacity
    pub infeasible_fraction: f64,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Best Value:  {}", self.value)?;
        writeln!(f, "Best Solution: {}", self.selection)?;
        writeln!(f, "Expectation: {:.6}", self.expectation)?;
        write!(
            f,
            "Iterations: {} ({} evaluations{})",
            self.iterations,
            self.evaluations,
            if self.converged { "" } else { ", not converged" }
        )
    }
}

/// QAOA solver for the quadratic knapsack problem with a QTG mixer
#[derive(Debug, Clone)]
pub struct QtgQaoaSolver {
    config: SolverConfig,
}

impl QtgQaoaSolver {
    /// Create a solver
    ///
    /// # Errors
    /// Returns a configuration error if `config` does not validate
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Evaluator for the configured backend
    pub fn evaluator(&self) -> Result<Box<dyn Evaluator>> {
        Ok(match self.config.backend {
            Backend::Statevector => Box::new(StatevectorEvaluator::new(self.config.seed)),
            Backend::Shots => Box::new(ShotEvaluator::new(self.config.shots, self.config.seed)?),
        })
    }

    /// Initial distribution over feasible selections, biased toward the
    /// greedy solution when `bias_per_item` is positive
    pub fn distribution(&self, instance: &Instance) -> Result<FeasibleDistribution> {
        let mut generator = FeasibleDistributionGenerator::for_instance(instance).uniform(self.config.uniform);
        if self.config.bias_per_item > 0.0 {
            let greedy = greedy_deletion(instance);
            let strength = self.config.bias_per_item * instance.num_items() as f64;
            debug!(
                reference = %greedy.selection,
                value = greedy.value,
                strength,
                "Biasing tree toward greedy selection"
            );
            generator = generator.with_bias(TreeBias::new(greedy.selection, strength)?)?;
        }
        Ok(generator.generate()?)
    }

    /// Build the cost operator, preparer and ansatz for `instance`
    pub fn template(&self, instance: &Instance) -> Result<AnsatzTemplate> {
        let cost = CostOperator::from_instance(instance);
        info!(
            items = instance.num_items(),
            terms = cost.terms().count(),
            offset = cost.offset(),
            "Built cost operator"
        );

        let distribution = self.distribution(instance)?;
        info!(
            feasible = distribution.len(),
            uniform = self.config.uniform,
            "Generated feasible distribution"
        );

        let preparer = StatePreparer::new(&distribution, false)?;
        debug!(rotations = preparer.num_rotations(), "Compiled state preparer");

        let template = AnsatzTemplate::new(Arc::new(cost), Arc::new(preparer), self.config.layers)?
            .with_mixer(self.config.mixer);
        Ok(template)
    }

    /// Run the full pipeline
    ///
    /// `progress` is called once per optimizer iteration.
    ///
    /// # Errors
    /// Construction errors are returned before any evaluator call;
    /// simulation and optimization errors propagate unchanged
    pub fn solve(
        &self,
        instance: &Instance,
        evaluator: &dyn Evaluator,
        progress: Option<&mut dyn FnMut(&OptimizationState)>,
    ) -> Result<Solution> {
        let template = self.template(instance)?;
        let initial = template.uniform_parameters(self.config.initial_gamma, self.config.initial_beta);

        info!(
            layers = template.layers(),
            mixer = %template.mixer_kind(),
            backend = evaluator.name(),
            "Optimizing ansatz parameters"
        );
        let optimizer = NelderMead::new(self.config.optimizer_config());
        let outcome = optimizer.minimize(
            |params| evaluator.expectation(&template, params, template.cost()),
            &initial,
            progress,
        )?;
        info!(
            value = outcome.value,
            iterations = outcome.iterations,
            evaluations = outcome.evaluations,
            converged = outcome.converged,
            "Optimization finished"
        );

        let counts = evaluator.sample(&template, &outcome.parameters, self.config.shots)?;
        let extracted = extract_solution(&counts, instance)?;

        let infeasible_fraction = counts.infeasible_fraction(instance);
        if infeasible_fraction > self.config.leakage_tolerance {
            warn!(
                infeasible_fraction,
                tolerance = self.config.leakage_tolerance,
                "Measured infeasible mass exceeds tolerance"
            );
        }
        info!(
            value = extracted.value,
            selection = %extracted.selection,
            count = extracted.count,
            shots = counts.shots(),
            "Extracted solution"
        );

        Ok(Solution {
            value: extracted.value,
            selection: extracted.selection,
            feasible: extracted.feasible,
            parameters: outcome.parameters,
            expectation: outcome.value,
            iterations: outcome.iterations,
            evaluations: outcome.evaluations,
            converged: outcome.converged,
            counts,
            infeasible_fraction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::mixer::MixerKind;

    fn instance() -> Instance {
        let profits = vec![vec![10, 0, 0], vec![0, 20, 0], vec![0, 0, 30]];
        Instance::new(3, profits, vec![2, 3, 4], 5).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig::default().with_layers(0);
        assert!(matches!(QtgQaoaSolver::new(config), Err(SolverError::Config(_))));
    }

    #[test]
    fn test_evaluator_follows_backend() {
        let solver = QtgQaoaSolver::new(SolverConfig::default()).unwrap();
        assert_eq!(solver.evaluator().unwrap().name(), "statevector");
        let solver = QtgQaoaSolver::new(SolverConfig::default().with_backend(Backend::Shots)).unwrap();
        assert_eq!(solver.evaluator().unwrap().name(), "shots");
    }

    #[test]
    fn test_bias_tilts_toward_greedy() {
        let instance = instance();
        let plain = QtgQaoaSolver::new(SolverConfig::default())
            .unwrap()
            .distribution(&instance)
            .unwrap()
            .normalized()
            .unwrap();
        let biased = QtgQaoaSolver::new(SolverConfig::default().with_bias_per_item(1.0))
            .unwrap()
            .distribution(&instance)
            .unwrap()
            .normalized()
            .unwrap();
        // greedy deletion keeps item 2 only
        let greedy: Bitstring = "001".parse().unwrap();
        assert!(biased.probability(&greedy) > plain.probability(&greedy));
        assert_eq!(biased.len(), plain.len());
    }

    #[test]
    fn test_template_matches_config() {
        let solver = QtgQaoaSolver::new(SolverConfig::default().with_layers(2)).unwrap();
        let template = solver.template(&instance()).unwrap();
        assert_eq!(template.layers(), 2);
        assert_eq!(template.num_items(), 3);
        assert_eq!(template.preparer().distribution().len(), 5);
        assert_eq!(template.mixer_kind(), MixerKind::Qtg);

        let solver = QtgQaoaSolver::new(SolverConfig::default().with_mixer(MixerKind::HammingWeight)).unwrap();
        let template = solver.template(&instance()).unwrap();
        assert_eq!(template.mixer_kind(), MixerKind::HammingWeight);
    }
}
