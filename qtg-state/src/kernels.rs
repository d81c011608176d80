//! Scalar amplitude kernels
//!
//! All kernels work in place on a `2^num_qubits` amplitude slice with
//! little-endian qubit order (qubit `q` is bit `q` of the basis index).

use num_complex::Complex64;

/// Apply a 2×2 matrix to `qubit`
pub fn apply_gate_scalar(
    state: &mut [Complex64],
    matrix: &[[Complex64; 2]; 2],
    qubit: usize,
    num_qubits: usize,
) {
    let dimension = 1usize << num_qubits;
    let qubit_mask = 1usize << qubit;

    let m00 = matrix[0][0];
    let m01 = matrix[0][1];
    let m10 = matrix[1][0];
    let m11 = matrix[1][1];

    for i in 0..dimension {
        // process each (0, 1) pair once from its low member
        if i & qubit_mask != 0 {
            continue;
        }
        let j = i | qubit_mask;

        let amp0 = state[i];
        let amp1 = state[j];
        state[i] = m00 * amp0 + m01 * amp1;
        state[j] = m10 * amp0 + m11 * amp1;
    }
}

/// Apply a real rotation to `target` on the subspace where the lower
/// `target` qubits spell `prefix`
///
/// The rotation is `R_y(theta) = [[cos θ/2, −sin θ/2], [sin θ/2, cos θ/2]]`.
/// Qubits above `target` are not constrained.
pub fn apply_prefix_controlled_ry_scalar(
    state: &mut [Complex64],
    target: usize,
    prefix: u64,
    theta: f64,
    num_qubits: usize,
) {
    let dimension = 1usize << num_qubits;
    let mask_target = 1usize << target;
    let mask_prefix = mask_target - 1;
    let prefix = prefix as usize & mask_prefix;

    let (sin, cos) = (theta / 2.0).sin_cos();

    for i in 0..dimension {
        if i & mask_target != 0 || i & mask_prefix != prefix {
            continue;
        }
        let j = i | mask_target;

        let a0 = state[i];
        let a1 = state[j];
        state[i] = a0 * cos - a1 * sin;
        state[j] = a0 * sin + a1 * cos;
    }
}

/// Multiply every amplitude by `e^{-i·scale·diagonal[k]}`
pub fn apply_diagonal_phase_scalar(state: &mut [Complex64], diagonal: &[f64], scale: f64) {
    for (amp, &d) in state.iter_mut().zip(diagonal.iter()) {
        *amp *= Complex64::from_polar(1.0, -scale * d);
    }
}

/// Multiply amplitudes whose `mask` bits are all zero by `e^{-i·phase}`
pub fn apply_zero_projector_phase_scalar(state: &mut [Complex64], mask: u64, phase: f64) {
    let factor = Complex64::from_polar(1.0, -phase);
    let mask = mask as usize;
    for (i, amp) in state.iter_mut().enumerate() {
        if i & mask == 0 {
            *amp *= factor;
        }
    }
}

/// Apply `RXX(2β)·RYY(2β) = e^{-iβ(XX+YY)}` to the qubit pair `(a, b)`
///
/// `XX+YY` vanishes on `|00⟩` and `|11⟩` and swaps `|01⟩ ↔ |10⟩` with
/// factor 2, so only the single-excitation pair rotates:
/// `[[cos 2β, −i sin 2β], [−i sin 2β, cos 2β]]`.
pub fn apply_xy_rotation_scalar(
    state: &mut [Complex64],
    qubit_a: usize,
    qubit_b: usize,
    beta: f64,
    num_qubits: usize,
) {
    let dimension = 1usize << num_qubits;
    let mask_a = 1usize << qubit_a;
    let mask_b = 1usize << qubit_b;

    let (sin, cos) = (2.0 * beta).sin_cos();
    let off = Complex64::new(0.0, -sin);

    for i in 0..dimension {
        // each pair once, from the member with `a` set and `b` clear
        if i & mask_a == 0 || i & mask_b != 0 {
            continue;
        }
        let j = i ^ mask_a ^ mask_b;

        let a0 = state[i];
        let a1 = state[j];
        state[i] = a0 * cos + off * a1;
        state[j] = off * a0 + a1 * cos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn basis(dim: usize, k: usize) -> Vec<Complex64> {
        let mut v = vec![Complex64::new(0.0, 0.0); dim];
        v[k] = Complex64::new(1.0, 0.0);
        v
    }

    #[test]
    fn test_pauli_x_scalar() {
        let mut state = basis(4, 0);
        let x = [
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ];
        apply_gate_scalar(&mut state, &x, 1, 2);
        assert_relative_eq!(state[2].re, 1.0);
        assert_relative_eq!(state[0].norm(), 0.0);
    }

    #[test]
    fn test_prefix_controlled_ry() {
        // |01⟩ (qubit 0 set): rotate qubit 1 only when qubit 0 reads 1
        let mut state = basis(4, 1);
        apply_prefix_controlled_ry_scalar(&mut state, 1, 1, std::f64::consts::PI, 2);
        assert_relative_eq!(state[3].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state[1].norm(), 0.0, epsilon = 1e-12);

        // prefix mismatch leaves |00⟩ untouched
        let mut state = basis(4, 0);
        apply_prefix_controlled_ry_scalar(&mut state, 1, 1, std::f64::consts::PI, 2);
        assert_relative_eq!(state[0].re, 1.0);
    }

    #[test]
    fn test_zero_projector_phase() {
        let mut state = vec![Complex64::new(0.5, 0.0); 4];
        apply_zero_projector_phase_scalar(&mut state, 0b01, std::f64::consts::PI);
        assert_relative_eq!(state[0].re, -0.5, epsilon = 1e-12);
        assert_relative_eq!(state[2].re, -0.5, epsilon = 1e-12);
        assert_relative_eq!(state[1].re, 0.5);
        assert_relative_eq!(state[3].re, 0.5);
    }

    #[test]
    fn test_xy_rotation_swaps_excitation() {
        // |01⟩ (qubit 0 set) at β = π/4 moves fully to |10⟩ with phase −i
        let mut state = basis(4, 0b01);
        apply_xy_rotation_scalar(&mut state, 0, 1, std::f64::consts::FRAC_PI_4, 2);
        assert_relative_eq!(state[0b01].norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(state[0b10].im, -1.0, epsilon = 1e-12);

        // |00⟩ and |11⟩ are untouched
        for k in [0b00, 0b11] {
            let mut state = basis(4, k);
            apply_xy_rotation_scalar(&mut state, 0, 1, 0.83, 2);
            assert_relative_eq!(state[k].re, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_xy_rotation_ignores_spectator() {
        // qubits 0 and 2 rotate, qubit 1 stays set
        let mut state = basis(8, 0b011);
        apply_xy_rotation_scalar(&mut state, 0, 2, 0.3, 3);
        let (sin, cos) = 0.6f64.sin_cos();
        assert_relative_eq!(state[0b011].re, cos, epsilon = 1e-12);
        assert_relative_eq!(state[0b110].im, -sin, epsilon = 1e-12);
        let total: f64 = state.iter().map(|a| a.norm_sqr()).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonal_phase() {
        let mut state = vec![Complex64::new(1.0, 0.0); 2];
        apply_diagonal_phase_scalar(&mut state, &[0.0, 1.0], std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(state[0].re, 1.0);
        assert_relative_eq!(state[1].im, -1.0, epsilon = 1e-12);
    }
}
