//! Mixing operators for the QAOA layers
//!
//! Two mixers are available:
//!
//! - [`QtgMixer`]: `U · e^{-iβ|0⟩⟨0|} · U⁻¹` with the tree preparer `U`.
//!   Conjugating the zero-state phase by the preparer yields
//!   `I + (e^{-iβ} − 1)|F⟩⟨F|` with `|F⟩ = U|0…0⟩`. The mixer therefore only
//!   moves amplitude along `|F⟩`, and any state supported on feasible
//!   selections stays supported on feasible selections.
//! - [`HammingWeightMixer`]: `RXX(2β)·RYY(2β)` on every item pair. It keeps
//!   the number of selected items fixed but not the capacity constraint, so
//!   it suits instances where every feasible selection has the same size.

use crate::error::{Result, SolverError};
use crate::prep::StatePreparer;
use qtg_state::DenseState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which mixer the ansatz layers use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixerKind {
    /// Preparer-conjugated zero-state phase
    #[default]
    Qtg,
    /// XY rotations on all item pairs
    HammingWeight,
}

impl fmt::Display for MixerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixerKind::Qtg => write!(f, "qtg"),
            MixerKind::HammingWeight => write!(f, "hamming_weight"),
        }
    }
}

impl FromStr for MixerKind {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "qtg" => Ok(MixerKind::Qtg),
            "hamming_weight" => Ok(MixerKind::HammingWeight),
            other => Err(SolverError::Config(format!("Unknown mixer {:?}", other))),
        }
    }
}

/// Mixer built on a shared preparer
#[derive(Debug, Clone)]
pub struct QtgMixer {
    preparer: Arc<StatePreparer>,
}

impl QtgMixer {
    pub fn new(preparer: Arc<StatePreparer>) -> Self {
        Self { preparer }
    }

    pub fn preparer(&self) -> &StatePreparer {
        &self.preparer
    }

    /// Apply the mixer with angle `beta` in place
    pub fn apply(&self, state: &mut DenseState, beta: f64) -> Result<()> {
        self.preparer.apply_inverse(state)?;
        state.apply_zero_projector_phase(self.preparer.active_mask(), beta)?;
        self.preparer.apply(state)?;
        Ok(())
    }
}

/// Pairwise XY mixer over the item qubits
///
/// Padding qubits above `num_items` are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HammingWeightMixer {
    num_items: usize,
}

impl HammingWeightMixer {
    pub fn new(num_items: usize) -> Self {
        Self { num_items }
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Apply `e^{-iβ(XX+YY)}` to pairs `(0,1), (0,2), …, (n−2,n−1)` in turn
    pub fn apply(&self, state: &mut DenseState, beta: f64) -> Result<()> {
        for i in 0..self.num_items {
            for j in (i + 1)..self.num_items {
                state.apply_xy_rotation(i, j, beta)?;
            }
        }
        Ok(())
    }
}

/// The mixer of an ansatz
#[derive(Debug, Clone)]
pub enum Mixer {
    Qtg(QtgMixer),
    HammingWeight(HammingWeightMixer),
}

impl Mixer {
    /// Build the mixer of `kind` for the register of `preparer`
    pub fn new(kind: MixerKind, preparer: Arc<StatePreparer>) -> Self {
        match kind {
            MixerKind::Qtg => Mixer::Qtg(QtgMixer::new(preparer)),
            MixerKind::HammingWeight => {
                Mixer::HammingWeight(HammingWeightMixer::new(preparer.num_items()))
            }
        }
    }

    pub fn kind(&self) -> MixerKind {
        match self {
            Mixer::Qtg(_) => MixerKind::Qtg,
            Mixer::HammingWeight(_) => MixerKind::HammingWeight,
        }
    }

    /// Apply the mixer with angle `beta` in place
    pub fn apply(&self, state: &mut DenseState, beta: f64) -> Result<()> {
        match self {
            Mixer::Qtg(mixer) => mixer.apply(state, beta),
            Mixer::HammingWeight(mixer) => mixer.apply(state, beta),
        }
    }
}
