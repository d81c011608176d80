//! Randomized invariants of the feasible distribution

use proptest::prelude::*;
use qtg_core::{exhaustive, Bitstring, FeasibleDistributionGenerator, TreeBias};

fn weights_and_capacity() -> impl Strategy<Value = (Vec<i64>, i64)> {
    (prop::collection::vec(0i64..12, 1..9), 0i64..30)
}

proptest! {
    #[test]
    fn every_key_respects_capacity((weights, capacity) in weights_and_capacity()) {
        let dist = FeasibleDistributionGenerator::new(weights.clone(), capacity)
            .unwrap()
            .generate()
            .unwrap();
        for (bits, _) in dist.iter() {
            let total: i64 = bits.selected().map(|i| weights[i]).sum();
            prop_assert!(total <= capacity);
            prop_assert_eq!(bits.len(), weights.len());
        }
    }

    #[test]
    fn empty_selection_has_positive_weight(
        (weights, capacity) in weights_and_capacity(),
        uniform in any::<bool>(),
    ) {
        let dist = FeasibleDistributionGenerator::new(weights.clone(), capacity)
            .unwrap()
            .uniform(uniform)
            .generate()
            .unwrap();
        let zero = Bitstring::zeros(weights.len());
        prop_assert!(dist.get(&zero).unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn weights_are_normalized(
        (weights, capacity) in weights_and_capacity(),
        strength in 0.0f64..10.0,
    ) {
        let reference = Bitstring::from_bits(weights.iter().map(|w| w % 2 == 0).collect());
        let dist = FeasibleDistributionGenerator::new(weights, capacity)
            .unwrap()
            .with_bias(TreeBias::new(reference, strength).unwrap())
            .unwrap()
            .generate()
            .unwrap();
        prop_assert!((dist.total_weight() - 1.0).abs() < 1e-8);
    }

    #[test]
    fn tree_enumerates_every_feasible_selection((weights, capacity) in weights_and_capacity()) {
        let n = weights.len();
        let brute = (0u64..(1 << n))
            .filter(|&k| {
                let b = Bitstring::from_index(k, n);
                b.selected().map(|i| weights[i]).sum::<i64>() <= capacity
            })
            .count();
        let tree = FeasibleDistributionGenerator::new(weights, capacity)
            .unwrap()
            .build_tree();
        prop_assert_eq!(tree.num_feasible() as usize, brute);
    }
}

#[test]
fn exhaustive_matches_brute_force() {
    let profits = vec![
        vec![4, 3, 0, 1],
        vec![3, 2, 5, 0],
        vec![0, 5, 1, 2],
        vec![1, 0, 2, 6],
    ];
    let instance = qtg_core::Instance::new(4, profits, vec![3, 2, 2, 4], 6).unwrap();
    let best = (0u64..16)
        .map(|k| Bitstring::from_index(k, 4))
        .filter(|b| instance.is_feasible(b))
        .map(|b| instance.value(&b))
        .max()
        .unwrap();
    assert_eq!(exhaustive(&instance).value, best);
}
