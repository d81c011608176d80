//! Dense amplitude vector over `2^n` basis states
//!
//! This is the working representation for exact evolution of the ansatz:
//! diagonal phases for the cost operator, prefix-controlled rotations for
//! state preparation and a zero-projector phase for the mixer.

use crate::error::{Result, StateError};
use crate::kernels::{
    apply_diagonal_phase_scalar, apply_gate_scalar, apply_prefix_controlled_ry_scalar,
    apply_xy_rotation_scalar, apply_zero_projector_phase_scalar,
};
use num_complex::Complex64;
use std::fmt;

/// Largest supported register
pub const MAX_QUBITS: usize = 30;

/// Dense quantum state
///
/// # Example
///
/// ```
/// use qtg_state::DenseState;
/// use num_complex::Complex64;
///
/// let mut state = DenseState::new(2).unwrap();
///
/// let hadamard = [
///     [Complex64::new(0.7071067811865476, 0.0), Complex64::new(0.7071067811865476, 0.0)],
///     [Complex64::new(0.7071067811865476, 0.0), Complex64::new(-0.7071067811865476, 0.0)],
/// ];
/// state.apply_single_qubit_gate(&hadamard, 0).unwrap();
///
/// assert_eq!(state.num_qubits(), 2);
/// assert!(state.is_normalized(1e-10));
/// ```
#[derive(Clone, PartialEq)]
pub struct DenseState {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl DenseState {
    /// Create a new dense state initialized to |0...0⟩
    ///
    /// # Errors
    /// Returns error if `num_qubits` exceeds [`MAX_QUBITS`]
    ///
    /// # Example
    /// ```
    /// use qtg_state::DenseState;
    ///
    /// let state = DenseState::new(3).unwrap();
    /// assert_eq!(state.num_qubits(), 3);
    /// assert_eq!(state.dimension(), 8);
    /// ```
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::InvalidDimension {
                dimension: 1usize << num_qubits.min(63),
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1usize << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Create a dense state from amplitude data
    ///
    /// # Errors
    /// Returns error if the slice length is not `2^num_qubits`
    pub fn from_amplitudes(num_qubits: usize, amplitudes: &[Complex64]) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::InvalidDimension {
                dimension: amplitudes.len(),
            });
        }
        let expected = 1usize << num_qubits;
        if amplitudes.len() != expected {
            return Err(StateError::DimensionMismatch {
                expected,
                actual: amplitudes.len(),
            });
        }
        Ok(Self {
            num_qubits,
            amplitudes: amplitudes.to_vec(),
        })
    }

    /// Get the number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the state dimension (2^num_qubits)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Get a reference to the state amplitudes
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Get a mutable reference to the state amplitudes
    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Compute the norm of the state
    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt()
    }

    /// Check if |norm - 1| < epsilon
    pub fn is_normalized(&self, epsilon: f64) -> bool {
        (self.norm() - 1.0).abs() < epsilon
    }

    /// Normalize the state to have unit norm
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            let inv = 1.0 / norm;
            for amp in &mut self.amplitudes {
                *amp *= inv;
            }
        }
    }

    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index: qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply a single-qubit gate to the state
    ///
    /// # Arguments
    /// * `matrix` - 2×2 gate matrix in row-major order
    /// * `qubit` - Index of the qubit to apply the gate to (0-indexed)
    ///
    /// # Errors
    /// Returns error if qubit index is invalid
    pub fn apply_single_qubit_gate(
        &mut self,
        matrix: &[[Complex64; 2]; 2],
        qubit: usize,
    ) -> Result<()> {
        self.check_qubit(qubit)?;
        apply_gate_scalar(&mut self.amplitudes, matrix, qubit, self.num_qubits);
        Ok(())
    }

    /// Apply `R_y(theta)` to `target`, controlled on qubits `0..target`
    /// reading `prefix`
    ///
    /// # Errors
    /// Returns error if the target qubit index is invalid
    pub fn apply_prefix_controlled_ry(&mut self, target: usize, prefix: u64, theta: f64) -> Result<()> {
        self.check_qubit(target)?;
        apply_prefix_controlled_ry_scalar(&mut self.amplitudes, target, prefix, theta, self.num_qubits);
        Ok(())
    }

    /// Apply `e^{-i·scale·D}` for a diagonal operator `D`
    ///
    /// # Errors
    /// Returns error if the diagonal length differs from the dimension
    pub fn apply_diagonal_phase(&mut self, diagonal: &[f64], scale: f64) -> Result<()> {
        if diagonal.len() != self.dimension() {
            return Err(StateError::DimensionMismatch {
                expected: self.dimension(),
                actual: diagonal.len(),
            });
        }
        apply_diagonal_phase_scalar(&mut self.amplitudes, diagonal, scale);
        Ok(())
    }

    /// Apply the phase `e^{-i·phase}` to basis states whose `mask` qubits are
    /// all zero
    ///
    /// # Errors
    /// Returns error if the mask addresses qubits outside the register
    pub fn apply_zero_projector_phase(&mut self, mask: u64, phase: f64) -> Result<()> {
        if self.num_qubits < 64 && mask >> self.num_qubits != 0 {
            return Err(StateError::InvalidQubitIndex {
                index: 63 - mask.leading_zeros() as usize,
                num_qubits: self.num_qubits,
            });
        }
        apply_zero_projector_phase_scalar(&mut self.amplitudes, mask, phase);
        Ok(())
    }

    /// Apply `e^{-iβ(XX+YY)}` to qubits `qubit_a` and `qubit_b`
    ///
    /// The rotation only exchanges `|01⟩` and `|10⟩` on the pair, so the
    /// number of set qubits of every basis state is preserved.
    ///
    /// # Errors
    /// Returns error if either index is invalid or both are equal
    pub fn apply_xy_rotation(&mut self, qubit_a: usize, qubit_b: usize, beta: f64) -> Result<()> {
        self.check_qubit(qubit_a)?;
        self.check_qubit(qubit_b)?;
        if qubit_a == qubit_b {
            return Err(StateError::DuplicateQubit { qubit: qubit_a });
        }
        apply_xy_rotation_scalar(&mut self.amplitudes, qubit_a, qubit_b, beta, self.num_qubits);
        Ok(())
    }

    /// Get the probability of measuring a specific computational basis state
    ///
    /// # Errors
    /// Returns error if basis_state is out of bounds
    pub fn get_probability(&self, basis_state: usize) -> Result<f64> {
        self.amplitudes
            .get(basis_state)
            .map(|a| a.norm_sqr())
            .ok_or(StateError::InvalidDimension {
                dimension: basis_state,
            })
    }

    /// Get probabilities for all computational basis states
    pub fn get_all_probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Get the expectation value of a diagonal observable
    ///
    /// # Errors
    /// Returns error if observable dimension doesn't match state dimension
    pub fn expectation_value(&self, observable: &[f64]) -> Result<f64> {
        if observable.len() != self.dimension() {
            return Err(StateError::DimensionMismatch {
                expected: self.dimension(),
                actual: observable.len(),
            });
        }

        Ok(self
            .amplitudes
            .iter()
            .zip(observable.iter())
            .map(|(amp, obs)| amp.norm_sqr() * obs)
            .sum())
    }

    /// Compute the inner product with another state: ⟨self|other⟩
    ///
    /// # Errors
    /// Returns error if states have different dimensions
    pub fn inner_product(&self, other: &DenseState) -> Result<Complex64> {
        if self.dimension() != other.dimension() {
            return Err(StateError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }

        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Fidelity |⟨self|other⟩|²
    pub fn fidelity(&self, other: &DenseState) -> Result<f64> {
        Ok(self.inner_product(other)?.norm_sqr())
    }
}

impl fmt::Debug for DenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseState")
            .field("num_qubits", &self.num_qubits)
            .field("dimension", &self.dimension())
            .field("norm", &self.norm())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state() {
        let state = DenseState::new(2).unwrap();
        assert_relative_eq!(state.amplitudes()[0].re, 1.0);
        assert!(state.is_normalized(1e-12));
        assert_relative_eq!(state.get_probability(0).unwrap(), 1.0);
        assert!(state.get_probability(4).is_err());
    }

    #[test]
    fn test_from_amplitudes() {
        let amps = vec![Complex64::new(0.6, 0.0), Complex64::new(0.0, 0.8)];
        let state = DenseState::from_amplitudes(1, &amps).unwrap();
        let probs = state.get_all_probabilities();
        assert_relative_eq!(probs[0], 0.36, epsilon = 1e-12);
        assert_relative_eq!(probs[1], 0.64, epsilon = 1e-12);
        assert!(DenseState::from_amplitudes(2, &amps).is_err());
    }

    #[test]
    fn test_ry_round_trip() {
        let mut state = DenseState::new(3).unwrap();
        state.apply_prefix_controlled_ry(0, 0, 1.1).unwrap();
        state.apply_prefix_controlled_ry(1, 1, 0.7).unwrap();
        state.apply_prefix_controlled_ry(2, 0b10, 2.3).unwrap();
        assert!(state.is_normalized(1e-12));

        state.apply_prefix_controlled_ry(2, 0b10, -2.3).unwrap();
        state.apply_prefix_controlled_ry(1, 1, -0.7).unwrap();
        state.apply_prefix_controlled_ry(0, 0, -1.1).unwrap();
        assert_relative_eq!(state.get_probability(0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_xy_rotation_checks_qubits() {
        let mut state = DenseState::new(2).unwrap();
        assert!(matches!(
            state.apply_xy_rotation(1, 1, 0.5),
            Err(StateError::DuplicateQubit { qubit: 1 })
        ));
        assert!(matches!(
            state.apply_xy_rotation(0, 2, 0.5),
            Err(StateError::InvalidQubitIndex { index: 2, .. })
        ));
        state.apply_xy_rotation(0, 1, 0.5).unwrap();
        assert!(state.is_normalized(1e-12));
    }

    #[test]
    fn test_expectation_value() {
        let amps = vec![Complex64::new(0.6, 0.0), Complex64::new(0.8, 0.0)];
        let state = DenseState::from_amplitudes(1, &amps).unwrap();
        assert_relative_eq!(
            state.expectation_value(&[1.0, -1.0]).unwrap(),
            0.36 - 0.64,
            epsilon = 1e-12
        );
        assert!(state.expectation_value(&[1.0]).is_err());
    }

    #[test]
    fn test_phases_preserve_probabilities() {
        let mut state = DenseState::new(2).unwrap();
        let h = 1.0 / 2f64.sqrt();
        let hadamard = [
            [Complex64::new(h, 0.0), Complex64::new(h, 0.0)],
            [Complex64::new(h, 0.0), Complex64::new(-h, 0.0)],
        ];
        state.apply_single_qubit_gate(&hadamard, 0).unwrap();
        let before = state.get_all_probabilities();
        state.apply_diagonal_phase(&[0.0, 1.0, 2.0, 3.0], 0.4).unwrap();
        state.apply_zero_projector_phase(0b11, 1.3).unwrap();
        for (a, b) in before.iter().zip(state.get_all_probabilities()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
        assert!(state.apply_zero_projector_phase(0b100, 1.0).is_err());
    }

    #[test]
    fn test_invalid_qubit_index() {
        let mut state = DenseState::new(2).unwrap();
        assert_eq!(
            state.apply_prefix_controlled_ry(2, 0, 1.0),
            Err(StateError::InvalidQubitIndex {
                index: 2,
                num_qubits: 2
            })
        );
        assert!(DenseState::new(MAX_QUBITS + 1).is_err());
    }

    #[test]
    fn test_fidelity() {
        let a = DenseState::new(1).unwrap();
        let b = DenseState::from_amplitudes(1, &[Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)]).unwrap();
        assert_relative_eq!(a.fidelity(&a).unwrap(), 1.0);
        assert_relative_eq!(a.fidelity(&b).unwrap(), 0.0);
    }
}
