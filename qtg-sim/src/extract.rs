//! Picking the reported selection from measured counts

use crate::error::{Result, SolverError};
use crate::evaluator::SampleCounts;
use qtg_core::{Bitstring, Instance};
use tracing::warn;

/// The most frequent measured selection
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSolution {
    pub selection: Bitstring,
    /// Objective recomputed from the profit matrix
    pub value: i64,
    pub count: usize,
    pub feasible: bool,
}

/// Select the selection with the highest count
///
/// Ties go to the smallest selection in bit-string order. The objective is
/// recomputed from the instance rather than taken from any energy estimate.
/// An infeasible winner is still returned but logged as a warning.
///
/// # Errors
/// Returns a simulation error if there are no counts
pub fn extract_solution(counts: &SampleCounts, instance: &Instance) -> Result<ExtractedSolution> {
    // iteration is in ascending bit-string order, so keep the first maximum
    let mut winner: Option<(&Bitstring, usize)> = None;
    for (bits, count) in counts.iter() {
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((bits, count));
        }
    }
    let (bits, count) = winner
        .filter(|(_, c)| *c > 0)
        .ok_or_else(|| SolverError::Simulation("No samples to extract a solution from".into()))?;

    if bits.len() != instance.num_items() {
        return Err(SolverError::Simulation(format!(
            "Measured {} bits for a {}-item instance",
            bits.len(),
            instance.num_items()
        )));
    }

    let feasible = instance.is_feasible(bits);
    if !feasible {
        warn!(
            selection = %bits,
            weight = instance.total_weight(bits),
            capacity = instance.capacity(),
            "Most frequent selection violates the capacity constraint"
        );
    }

    Ok(ExtractedSolution {
        selection: bits.clone(),
        value: instance.value(bits),
        count,
        feasible,
    })
}
