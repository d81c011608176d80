//! Classical reference solvers
//!
//! These give the quantum pipeline a bias source (greedy deletion) and a
//! ground truth for benchmarking (exhaustive search over the feasible tree).

use crate::bitstring::Bitstring;
use crate::instance::Instance;
use crate::tree::FeasibleDistributionGenerator;
use std::cmp::Ordering;

/// A selection together with its objective value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicalSolution {
    pub value: i64,
    pub selection: Bitstring,
}

impl ClassicalSolution {
    fn of(instance: &Instance, selection: Bitstring) -> Self {
        Self {
            value: instance.value(&selection),
            selection,
        }
    }
}

/// Marginal loss of dropping `item` from `selection`
fn removal_loss(instance: &Instance, selection: &Bitstring, item: usize) -> i64 {
    selection
        .selected()
        .filter(|&j| j != item)
        .map(|j| instance.profit(item, j))
        .sum::<i64>()
        + instance.profit(item, item)
}

/// Greedy deletion heuristic
///
/// Starts with every item selected and, while the capacity is exceeded,
/// drops the selected item with the smallest objective loss per unit of
/// weight. Ties go to the lower index. Zero-weight items are never dropped
/// since removing them cannot restore feasibility.
pub fn greedy_deletion(instance: &Instance) -> ClassicalSolution {
    let n = instance.num_items();
    let weights = instance.weights();
    let mut selection = Bitstring::from_bits(vec![true; n]);
    let mut total = instance.total_weight(&selection);

    while total > instance.capacity() {
        let candidate = selection
            .selected()
            .filter(|&i| weights[i] > 0)
            .map(|i| {
                let ratio = removal_loss(instance, &selection, i) as f64 / weights[i] as f64;
                (ratio, i)
            })
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));

        let Some((_, item)) = candidate else {
            break;
        };
        selection = selection.with_bit(item, false);
        total -= weights[item];
    }

    ClassicalSolution::of(instance, selection)
}

/// Exact optimum by enumerating every feasible selection
///
/// Ties resolve to the smallest selection in bit-string order. The feasible
/// set grows exponentially, so this is meant for small benchmark instances.
pub fn exhaustive(instance: &Instance) -> ClassicalSolution {
    let tree = FeasibleDistributionGenerator::for_instance(instance).build_tree();
    let mut best = ClassicalSolution::of(instance, Bitstring::zeros(instance.num_items()));
    // Leaves come out in bit-string order, so only strict improvements replace.
    for (selection, _) in tree.leaf_paths() {
        let value = instance.value(&selection);
        if value > best.value {
            best = ClassicalSolution { value, selection };
        }
    }
    best
}

/// Relative gap of `value` below `reference`, in percent
///
/// Returns 0 when the reference value is 0.
pub fn relative_gap(reference: i64, value: i64) -> f64 {
    if reference == 0 {
        return 0.0;
    }
    (reference - value) as f64 / reference.unsigned_abs() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn example() -> Instance {
        let profits = vec![vec![10, 0, 0], vec![0, 20, 0], vec![0, 0, 30]];
        Instance::new(3, profits, vec![2, 3, 4], 5).unwrap()
    }

    #[test]
    fn test_exhaustive_tie_break() {
        // 110 and 001 both score 30; 001 sorts first
        let best = exhaustive(&example());
        assert_eq!(best.value, 30);
        assert_eq!(best.selection.to_string(), "001");
    }

    #[test]
    fn test_greedy_is_feasible() {
        let instance = example();
        let greedy = greedy_deletion(&instance);
        assert!(instance.is_feasible(&greedy.selection));
        assert_eq!(greedy.value, instance.value(&greedy.selection));
        assert!(greedy.value <= exhaustive(&instance).value);
    }

    #[test]
    fn test_greedy_uses_interactions() {
        // item 2 alone is worth little, but pairs strongly with item 0
        let profits = vec![vec![5, 0, 9], vec![0, 6, 0], vec![9, 0, 1]];
        let instance = Instance::new(3, profits, vec![1, 1, 1], 2).unwrap();
        let greedy = greedy_deletion(&instance);
        assert_eq!(greedy.selection.to_string(), "101");
        assert_eq!(greedy.value, 15);
    }

    #[test]
    fn test_relative_gap() {
        assert_relative_eq!(relative_gap(100, 90), 10.0);
        assert_relative_eq!(relative_gap(0, 5), 0.0);
        assert_relative_eq!(relative_gap(-50, -60), 20.0);
    }
}
