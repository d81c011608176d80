//! Layered QAOA ansatz with late parameter binding
//!
//! The template is built once per solve and reused for every objective
//! evaluation. Parameters are ordered `(γ₁..γ_p, β₁..β_p)`. The mixer
//! defaults to [`MixerKind::Qtg`].

use crate::error::{Result, SolverError};
use crate::mixer::{Mixer, MixerKind};
use crate::prep::StatePreparer;
use qtg_state::{CostOperator, DenseState};
use std::sync::Arc;

/// Immutable description of `p` cost/mixer layers
#[derive(Debug, Clone)]
pub struct AnsatzTemplate {
    cost: Arc<CostOperator>,
    preparer: Arc<StatePreparer>,
    mixer: Mixer,
    layers: usize,
    diagonal: Arc<Vec<f64>>,
}

impl AnsatzTemplate {
    /// Compose the template
    ///
    /// # Errors
    /// Returns a construction error if `layers` is 0 or the cost operator and
    /// preparer act on registers of different width
    pub fn new(cost: Arc<CostOperator>, preparer: Arc<StatePreparer>, layers: usize) -> Result<Self> {
        if layers == 0 {
            return Err(SolverError::Construction(
                "Ansatz needs at least one layer".into(),
            ));
        }
        if cost.width() != preparer.width() {
            return Err(SolverError::Construction(format!(
                "Cost operator width {} does not match preparer width {}",
                cost.width(),
                preparer.width()
            )));
        }
        if cost.num_items() != preparer.num_items() {
            return Err(SolverError::Construction(format!(
                "Cost operator covers {} items, preparer covers {}",
                cost.num_items(),
                preparer.num_items()
            )));
        }
        let diagonal = Arc::new(cost.diagonal());
        let mixer = Mixer::new(MixerKind::Qtg, preparer.clone());
        Ok(Self {
            cost,
            preparer,
            mixer,
            layers,
            diagonal,
        })
    }

    /// Replace the mixer of every layer
    pub fn with_mixer(mut self, kind: MixerKind) -> Self {
        self.mixer = Mixer::new(kind, self.preparer.clone());
        self
    }

    pub fn mixer_kind(&self) -> MixerKind {
        self.mixer.kind()
    }

    #[inline]
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Number of free parameters (`2p`)
    #[inline]
    pub fn num_parameters(&self) -> usize {
        2 * self.layers
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.preparer.width()
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.preparer.num_items()
    }

    pub fn cost(&self) -> &CostOperator {
        &self.cost
    }

    pub fn preparer(&self) -> &StatePreparer {
        &self.preparer
    }

    /// Energies of every basis state, computed once at construction
    pub fn diagonal(&self) -> &[f64] {
        &self.diagonal
    }

    /// Parameter vector with the same `(γ, β)` in every layer
    pub fn uniform_parameters(&self, gamma: f64, beta: f64) -> Vec<f64> {
        let mut params = vec![gamma; self.layers];
        params.extend(std::iter::repeat(beta).take(self.layers));
        params
    }

    /// Attach concrete parameters
    ///
    /// # Errors
    /// Returns a simulation error if the parameter count is not `2p`
    pub fn bind<'a>(&'a self, params: &'a [f64]) -> Result<BoundAnsatz<'a>> {
        if params.len() != self.num_parameters() {
            return Err(SolverError::Simulation(format!(
                "Ansatz with {} layers expects {} parameters, got {}",
                self.layers,
                self.num_parameters(),
                params.len()
            )));
        }
        let (gammas, betas) = params.split_at(self.layers);
        Ok(BoundAnsatz {
            template: self,
            gammas,
            betas,
        })
    }
}

/// A template with bound parameters
#[derive(Debug, Clone, Copy)]
pub struct BoundAnsatz<'a> {
    template: &'a AnsatzTemplate,
    gammas: &'a [f64],
    betas: &'a [f64],
}

impl<'a> BoundAnsatz<'a> {
    pub fn gammas(&self) -> &[f64] {
        self.gammas
    }

    pub fn betas(&self) -> &[f64] {
        self.betas
    }

    /// Evolve `|0…0⟩` through the initial state and all layers
    pub fn prepare(&self) -> Result<DenseState> {
        let template = self.template;
        let mut state = template.preparer.prepare()?;
        for (&gamma, &beta) in self.gammas.iter().zip(self.betas) {
            state.apply_diagonal_phase(&template.diagonal, gamma)?;
            template.mixer.apply(&mut state, beta)?;
        }
        Ok(state)
    }
}
