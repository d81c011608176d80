//! State preparation from a feasible distribution
//!
//! The preparer is a prefix tree of rotations: for every depth `d` and every
//! value of qubits `0..d` that carries probability mass, qubit `d` is rotated
//! by `R_y(θ)` with `cos²(θ/2)` equal to the conditional probability that bit
//! `d` is 0. Applying all depths in order maps `|0…0⟩` onto
//! `Σ √p(x) |x⟩`; applying them in reverse with negated angles inverts it.

use crate::error::{Result, SolverError};
use ahash::AHashMap;
use qtg_core::FeasibleDistribution;
use qtg_state::{DenseState, MAX_QUBITS};

/// Rotations below this angle are skipped
const ANGLE_EPSILON: f64 = 1e-12;

/// Exactly invertible preparation unitary `U` with `U|0…0⟩ = Σ √p(x)|x⟩`
#[derive(Debug, Clone, PartialEq)]
pub struct StatePreparer {
    num_items: usize,
    width: usize,
    distribution: FeasibleDistribution,
    /// `angles[d]` maps the value of qubits `0..d` to the rotation of qubit `d`
    angles: Vec<AHashMap<u64, f64>>,
}

impl StatePreparer {
    /// Compile a distribution into rotation angles
    ///
    /// With `uniform` set, every key gets the same weight regardless of the
    /// input weights.
    ///
    /// # Errors
    /// Returns a construction error if all weights are zero or the register
    /// would be too large to simulate
    pub fn new(distribution: &FeasibleDistribution, uniform: bool) -> Result<Self> {
        let num_items = distribution.num_items();
        if num_items > MAX_QUBITS {
            return Err(SolverError::Construction(format!(
                "{} items exceed the simulator limit of {} qubits",
                num_items, MAX_QUBITS
            )));
        }
        let distribution = if uniform {
            distribution.uniformized()
        } else {
            distribution.normalized()?
        };

        // (total mass, mass with bit d = 0) per prefix
        let mut masses: Vec<AHashMap<u64, (f64, f64)>> = vec![AHashMap::new(); num_items];
        for (bits, p) in distribution.iter() {
            let index = bits.to_index();
            for (d, level) in masses.iter_mut().enumerate() {
                let prefix = index & ((1u64 << d) - 1);
                let entry = level.entry(prefix).or_insert((0.0, 0.0));
                entry.0 += p;
                if (index >> d) & 1 == 0 {
                    entry.1 += p;
                }
            }
        }

        let angles = masses
            .into_iter()
            .map(|level| {
                level
                    .into_iter()
                    .filter(|(_, (m, _))| *m > 0.0)
                    .map(|(prefix, (m, m0))| {
                        let ratio = (m0 / m).clamp(0.0, 1.0);
                        (prefix, 2.0 * ratio.sqrt().acos())
                    })
                    .filter(|(_, theta)| theta.abs() > ANGLE_EPSILON)
                    .collect()
            })
            .collect();

        Ok(Self {
            num_items,
            width: num_items,
            distribution,
            angles,
        })
    }

    /// Number of items (active qubits)
    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Register width (≥ number of items)
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bit mask of the active qubits
    #[inline]
    pub fn active_mask(&self) -> u64 {
        if self.num_items >= 64 {
            u64::MAX
        } else {
            (1u64 << self.num_items) - 1
        }
    }

    /// The (normalized, optionally uniformized) target distribution
    pub fn distribution(&self) -> &FeasibleDistribution {
        &self.distribution
    }

    /// Number of non-trivial rotations
    pub fn num_rotations(&self) -> usize {
        self.angles.iter().map(|level| level.len()).sum()
    }

    /// Identity-pad to a wider register; padding qubits are never touched
    ///
    /// # Errors
    /// Returns a construction error if `width` is smaller than the number of
    /// items or exceeds the simulator limit
    pub fn padded(&self, width: usize) -> Result<Self> {
        if width < self.num_items || width > MAX_QUBITS {
            return Err(SolverError::Construction(format!(
                "Cannot pad a {}-item preparer to width {}",
                self.num_items, width
            )));
        }
        let mut padded = self.clone();
        padded.width = width;
        Ok(padded)
    }

    fn check_width(&self, state: &DenseState) -> Result<()> {
        if state.num_qubits() != self.width {
            return Err(SolverError::Simulation(format!(
                "State has {} qubits, preparer expects {}",
                state.num_qubits(),
                self.width
            )));
        }
        Ok(())
    }

    /// Apply `U`
    pub fn apply(&self, state: &mut DenseState) -> Result<()> {
        self.check_width(state)?;
        for (d, level) in self.angles.iter().enumerate() {
            for (&prefix, &theta) in level {
                state.apply_prefix_controlled_ry(d, prefix, theta)?;
            }
        }
        Ok(())
    }

    /// Apply `U⁻¹`
    pub fn apply_inverse(&self, state: &mut DenseState) -> Result<()> {
        self.check_width(state)?;
        for (d, level) in self.angles.iter().enumerate().rev() {
            for (&prefix, &theta) in level {
                state.apply_prefix_controlled_ry(d, prefix, -theta)?;
            }
        }
        Ok(())
    }

    /// `U|0…0⟩` on the preparer's register
    pub fn prepare(&self) -> Result<DenseState> {
        let mut state = DenseState::new(self.width)?;
        self.apply(&mut state)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qtg_core::{Bitstring, FeasibleDistributionGenerator};

    fn bits(s: &str) -> Bitstring {
        s.parse().unwrap()
    }

    fn example() -> FeasibleDistribution {
        FeasibleDistributionGenerator::new(vec![2, 3, 4], 5)
            .unwrap()
            .generate()
            .unwrap()
    }

    #[test]
    fn test_prepared_probabilities_match() {
        let dist = example();
        let prep = StatePreparer::new(&dist, false).unwrap();
        let state = prep.prepare().unwrap();
        let probs = state.get_all_probabilities();
        for k in 0..8u64 {
            let b = Bitstring::from_index(k, 3);
            assert_relative_eq!(probs[k as usize], dist.probability(&b), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_uniform_flag_reapplied() {
        let prep = StatePreparer::new(&example(), true).unwrap();
        let probs = prep.prepare().unwrap().get_all_probabilities();
        assert_relative_eq!(probs[bits("110").to_index() as usize], 0.2, epsilon = 1e-10);
        assert_relative_eq!(probs[bits("101").to_index() as usize], 0.0, epsilon = 1e-20);
    }

    #[test]
    fn test_inverse_returns_to_zero_state() {
        let prep = StatePreparer::new(&example(), false).unwrap();
        let mut state = prep.prepare().unwrap();
        prep.apply_inverse(&mut state).unwrap();
        assert_relative_eq!(state.get_probability(0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_padding() {
        let prep = StatePreparer::new(&example(), false).unwrap();
        assert_eq!(prep.padded(3).unwrap(), prep);
        assert!(prep.padded(2).is_err());

        let wide = prep.padded(5).unwrap();
        let probs = wide.prepare().unwrap().get_all_probabilities();
        // padding qubits stay |0⟩
        let high: f64 = probs.iter().skip(8).sum();
        assert_relative_eq!(high, 0.0, epsilon = 1e-20);
        assert_relative_eq!(probs[bits("110").to_index() as usize], 0.25, epsilon = 1e-10);
    }

    #[test]
    fn test_point_mass_needs_no_rotation_on_zero() {
        let dist = FeasibleDistribution::from_entries(2, vec![(bits("00"), 1.0)]).unwrap();
        let prep = StatePreparer::new(&dist, false).unwrap();
        assert_eq!(prep.num_rotations(), 0);
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let dist = FeasibleDistribution::from_entries(1, vec![(bits("0"), 0.0)]).unwrap();
        assert!(matches!(
            StatePreparer::new(&dist, false),
            Err(SolverError::Construction(_))
        ));
        // uniform mode only looks at the keys
        assert!(StatePreparer::new(&dist, true).is_ok());
    }

    #[test]
    fn test_width_mismatch() {
        let prep = StatePreparer::new(&example(), false).unwrap();
        let mut state = DenseState::new(4).unwrap();
        assert!(matches!(prep.apply(&mut state), Err(SolverError::Simulation(_))));
    }
}
