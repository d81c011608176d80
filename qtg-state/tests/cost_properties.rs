use approx::assert_relative_eq;
use proptest::prelude::*;
use qtg_core::{Bitstring, Instance};
use qtg_state::{CostOperator, DenseState, ZTerm};

fn symmetric(n: usize, upper: &[i64], diag: &[i64]) -> Vec<Vec<i64>> {
    let mut p = vec![vec![0i64; n]; n];
    let mut k = 0;
    for i in 0..n {
        p[i][i] = diag[i];
        for j in (i + 1)..n {
            p[i][j] = upper[k];
            p[j][i] = upper[k];
            k += 1;
        }
    }
    p
}

proptest! {
    #[test]
    fn energy_matches_negative_objective(
        diag in prop::collection::vec(-20i64..50, 5),
        upper in prop::collection::vec(-10i64..30, 10),
    ) {
        let profits = symmetric(5, &upper, &diag);
        let instance = Instance::new(5, profits, vec![1; 5], 5).unwrap();
        let op = CostOperator::from_instance(&instance);
        let diagonal = op.diagonal();
        for k in 0..32u64 {
            let b = Bitstring::from_index(k, 5);
            prop_assert!((diagonal[k as usize] + instance.value(&b) as f64).abs() < 1e-9);
        }
    }
}

#[test]
fn diagonal_only_profits_have_no_pair_terms() {
    let profits = symmetric(4, &[0; 6], &[3, 1, 4, 1]);
    let op = CostOperator::from_profits(4, &profits).unwrap();
    assert_eq!(op.num_pair_terms(), 0);
    assert!(op.terms().all(|(t, _)| matches!(t, ZTerm::Single(_))));
}

#[test]
fn uniform_superposition_expectation_is_mean_energy() {
    let profits = symmetric(3, &[2, 0, 6], &[1, 2, 3]);
    let op = CostOperator::from_profits(3, &profits).unwrap();
    let amp = num_complex::Complex64::new((1.0f64 / 8.0).sqrt(), 0.0);
    let state = DenseState::from_amplitudes(3, &[amp; 8]).unwrap();
    let mean = op.diagonal().iter().sum::<f64>() / 8.0;
    assert_relative_eq!(op.expectation_value(&state).unwrap(), mean, epsilon = 1e-12);
}
