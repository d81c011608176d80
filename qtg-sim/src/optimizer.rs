//! Derivative-free parameter search
//!
//! Nelder-Mead simplex minimization. The method only needs objective
//! values, which suits shot-based estimates where gradients are noisy.
//!
//! # Algorithm
//!
//! 1. Build a simplex of `n+1` vertices around the initial point
//! 2. Order vertices by objective value
//! 3. Try reflection, expansion, contraction, or shrink
//! 4. Stop once the simplex radius and the spread of values are both below
//!    the tolerance

use crate::error::{Result, SolverError};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Configuration for the Nelder-Mead optimizer
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,

    /// Convergence tolerance for simplex radius and value spread
    pub tolerance: f64,

    /// Offset of the initial simplex vertices along each axis
    pub initial_step: f64,

    /// Return the best point instead of failing when the cap is reached
    pub allow_unconverged: bool,

    /// Reflection coefficient (default: 1.0)
    pub alpha: f64,

    /// Expansion coefficient (default: 2.0)
    pub gamma: f64,

    /// Contraction coefficient (default: 0.5)
    pub rho: f64,

    /// Shrink coefficient (default: 0.5)
    pub sigma: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-5,
            initial_step: 0.5,
            allow_unconverged: false,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

/// Progress of one optimizer run, handed to the callback every iteration
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationState {
    /// Iterations completed so far
    pub iteration: usize,
    /// Best vertex of the current simplex
    pub parameters: Vec<f64>,
    /// Lowest objective value seen in this run
    pub best_value: f64,
    /// Parameters of `best_value`
    pub best_parameters: Vec<f64>,
    /// Objective evaluations so far
    pub evaluations: usize,
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    pub parameters: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

/// Nelder-Mead simplex optimizer
#[derive(Debug, Clone, Default)]
pub struct NelderMead {
    config: NelderMeadConfig,
}

struct Tracker<'a, F> {
    objective: F,
    state: OptimizationState,
    progress: Option<&'a mut dyn FnMut(&OptimizationState)>,
}

impl<'a, F> Tracker<'a, F>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    fn eval(&mut self, params: &[f64]) -> Result<f64> {
        let value = (self.objective)(params)?;
        self.state.evaluations += 1;
        if !value.is_finite() {
            return Err(SolverError::Optimization(format!(
                "Objective returned non-finite value {} at {:?}",
                value, params
            )));
        }
        if value < self.state.best_value {
            self.state.best_value = value;
            self.state.best_parameters = params.to_vec();
        }
        Ok(value)
    }

    fn report(&mut self, iteration: usize, current: &[f64]) {
        self.state.iteration = iteration;
        self.state.parameters.clear();
        self.state.parameters.extend_from_slice(current);
        if let Some(callback) = self.progress.as_mut() {
            callback(&self.state);
        }
    }
}

impl NelderMead {
    pub fn new(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NelderMeadConfig {
        &self.config
    }

    /// Minimize `objective` starting from `initial`
    ///
    /// Errors returned by the objective propagate unchanged.
    ///
    /// # Errors
    /// Returns an optimization error on an empty parameter vector, a
    /// non-finite objective value, or when the iteration cap is reached
    /// without convergence (unless `allow_unconverged` is set)
    pub fn minimize<F>(
        &self,
        objective: F,
        initial: &[f64],
        progress: Option<&mut dyn FnMut(&OptimizationState)>,
    ) -> Result<OptimizationOutcome>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        let n = initial.len();
        if n == 0 {
            return Err(SolverError::Optimization(
                "Parameter vector must not be empty".into(),
            ));
        }

        let mut tracker = Tracker {
            objective,
            state: OptimizationState {
                iteration: 0,
                parameters: initial.to_vec(),
                best_value: f64::INFINITY,
                best_parameters: initial.to_vec(),
                evaluations: 0,
            },
            progress,
        };

        let mut simplex = self.initialize_simplex(initial);
        let mut values = Vec::with_capacity(n + 1);
        for vertex in &simplex {
            values.push(tracker.eval(vertex)?);
        }

        for iteration in 0..self.config.max_iterations {
            let mut indices: Vec<usize> = (0..simplex.len()).collect();
            indices.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

            let best_idx = indices[0];
            let worst_idx = indices[n];
            let second_worst_idx = indices[n - 1];
            let worst_value = values[worst_idx];

            let radius = self.compute_simplex_size(&simplex, &indices);
            let spread = worst_value - values[best_idx];

            tracker.report(iteration, &simplex[best_idx]);
            debug!(
                iteration,
                best = values[best_idx],
                radius,
                spread,
                "Nelder-Mead step"
            );

            if radius < self.config.tolerance && spread < self.config.tolerance {
                return Ok(OptimizationOutcome {
                    parameters: simplex[best_idx].clone(),
                    value: values[best_idx],
                    iterations: iteration,
                    evaluations: tracker.state.evaluations,
                    converged: true,
                });
            }

            let centroid = self.compute_centroid(&simplex, &indices[..n]);

            let reflected = self.reflect(&simplex[worst_idx], &centroid);
            let reflected_value = tracker.eval(&reflected)?;

            if reflected_value < values[best_idx] {
                let expanded = self.expand(&reflected, &centroid);
                let expanded_value = tracker.eval(&expanded)?;

                if expanded_value < reflected_value {
                    simplex[worst_idx] = expanded;
                    values[worst_idx] = expanded_value;
                } else {
                    simplex[worst_idx] = reflected;
                    values[worst_idx] = reflected_value;
                }
            } else if reflected_value < values[second_worst_idx] {
                simplex[worst_idx] = reflected;
                values[worst_idx] = reflected_value;
            } else {
                let contracted = if reflected_value < worst_value {
                    self.contract_outside(&reflected, &centroid)
                } else {
                    self.contract_inside(&simplex[worst_idx], &centroid)
                };
                let contracted_value = tracker.eval(&contracted)?;

                if contracted_value < worst_value.min(reflected_value) {
                    simplex[worst_idx] = contracted;
                    values[worst_idx] = contracted_value;
                } else {
                    let best_point = simplex[best_idx].clone();
                    self.shrink(&mut simplex, &best_point);
                    for i in 0..simplex.len() {
                        if i != best_idx {
                            values[i] = tracker.eval(&simplex[i])?;
                        }
                    }
                }
            }
        }

        let best_idx = (0..values.len())
            .min_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal))
            .unwrap_or(0);

        if !self.config.allow_unconverged {
            return Err(SolverError::Optimization(format!(
                "Nelder-Mead did not converge within {} iterations (best value {})",
                self.config.max_iterations, values[best_idx]
            )));
        }
        warn!(
            iterations = self.config.max_iterations,
            best = values[best_idx],
            "Nelder-Mead stopped at the iteration cap"
        );
        Ok(OptimizationOutcome {
            parameters: simplex[best_idx].clone(),
            value: values[best_idx],
            iterations: self.config.max_iterations,
            evaluations: tracker.state.evaluations,
            converged: false,
        })
    }

    /// Initial vertex plus one vertex offset along each axis
    fn initialize_simplex(&self, initial: &[f64]) -> Vec<Vec<f64>> {
        let mut simplex = vec![initial.to_vec()];
        for i in 0..initial.len() {
            let mut vertex = initial.to_vec();
            vertex[i] += self.config.initial_step;
            simplex.push(vertex);
        }
        simplex
    }

    fn compute_centroid(&self, simplex: &[Vec<f64>], indices: &[usize]) -> Vec<f64> {
        let n = simplex[0].len();
        let mut centroid = vec![0.0; n];

        for &idx in indices {
            for (c, x) in centroid.iter_mut().zip(&simplex[idx]) {
                *c += x;
            }
        }
        for c in &mut centroid {
            *c /= indices.len() as f64;
        }
        centroid
    }

    fn reflect(&self, worst: &[f64], centroid: &[f64]) -> Vec<f64> {
        worst
            .iter()
            .zip(centroid.iter())
            .map(|(&w, &c)| c + self.config.alpha * (c - w))
            .collect()
    }

    fn expand(&self, reflected: &[f64], centroid: &[f64]) -> Vec<f64> {
        reflected
            .iter()
            .zip(centroid.iter())
            .map(|(&r, &c)| c + self.config.gamma * (r - c))
            .collect()
    }

    fn contract_outside(&self, reflected: &[f64], centroid: &[f64]) -> Vec<f64> {
        reflected
            .iter()
            .zip(centroid.iter())
            .map(|(&r, &c)| c + self.config.rho * (r - c))
            .collect()
    }

    fn contract_inside(&self, worst: &[f64], centroid: &[f64]) -> Vec<f64> {
        worst
            .iter()
            .zip(centroid.iter())
            .map(|(&w, &c)| c + self.config.rho * (w - c))
            .collect()
    }

    /// Shrink simplex toward best point
    fn shrink(&self, simplex: &mut [Vec<f64>], best: &[f64]) {
        for vertex in simplex.iter_mut() {
            for (v, &b) in vertex.iter_mut().zip(best) {
                *v = b + self.config.sigma * (*v - b);
            }
        }
    }

    /// Max distance of a vertex from the centroid of all vertices
    fn compute_simplex_size(&self, simplex: &[Vec<f64>], indices: &[usize]) -> f64 {
        let centroid = self.compute_centroid(simplex, indices);
        indices
            .iter()
            .map(|&idx| {
                simplex[idx]
                    .iter()
                    .zip(centroid.iter())
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max)
    }
}
