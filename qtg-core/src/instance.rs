//! Quadratic knapsack problem instances

use crate::bitstring::Bitstring;
use crate::error::{Error, Result};

/// Check that a profit matrix is square with `num_items` rows
///
/// # Errors
/// Returns a construction error if the matrix is ragged or its size differs
/// from the declared item count
pub fn check_profit_matrix<R: AsRef<[i64]>>(num_items: usize, profits: &[R]) -> Result<()> {
    if profits.len() != num_items {
        return Err(Error::Construction(format!(
            "Profit matrix has {} rows, expected {}",
            profits.len(),
            num_items
        )));
    }
    for (i, row) in profits.iter().enumerate() {
        if row.as_ref().len() != num_items {
            return Err(Error::Construction(format!(
                "Profit matrix is not square: row {} has {} entries, expected {}",
                i,
                row.as_ref().len(),
                num_items
            )));
        }
    }
    Ok(())
}

/// A validated, immutable QKP instance
///
/// The objective of a selection `b` is
/// `Σᵢ Pᵢᵢ·bᵢ + Σ_{i<j} Pᵢⱼ·bᵢ·bⱼ`, i.e. each interaction is counted once.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    profits: Vec<Vec<i64>>,
    weights: Vec<u64>,
    capacity: u64,
}

impl Instance {
    /// Create an instance
    ///
    /// # Arguments
    /// * `num_items` - Declared number of items
    /// * `profits` - Symmetric `n×n` profit matrix
    /// * `weights` - Non-negative item weights
    /// * `capacity` - Non-negative knapsack capacity
    ///
    /// # Errors
    /// Returns a construction error on mismatched dimensions, an asymmetric
    /// profit matrix, or negative weights / capacity
    pub fn new(
        num_items: usize,
        profits: Vec<Vec<i64>>,
        weights: Vec<i64>,
        capacity: i64,
    ) -> Result<Self> {
        if num_items == 0 {
            return Err(Error::Construction("Instance must have at least one item".into()));
        }
        check_profit_matrix(num_items, &profits)?;
        for i in 0..num_items {
            for j in (i + 1)..num_items {
                if profits[i][j] != profits[j][i] {
                    return Err(Error::Construction(format!(
                        "Profit matrix is not symmetric at ({}, {}): {} != {}",
                        i, j, profits[i][j], profits[j][i]
                    )));
                }
            }
        }
        if weights.len() != num_items {
            return Err(Error::Construction(format!(
                "Weight vector has {} entries, expected {}",
                weights.len(),
                num_items
            )));
        }
        let weights = weights
            .into_iter()
            .enumerate()
            .map(|(i, w)| {
                u64::try_from(w).map_err(|_| {
                    Error::Construction(format!("Weight of item {} is negative: {}", i, w))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let capacity = u64::try_from(capacity)
            .map_err(|_| Error::Construction(format!("Capacity is negative: {}", capacity)))?;

        Ok(Self {
            profits,
            weights,
            capacity,
        })
    }

    /// Number of items
    #[inline]
    pub fn num_items(&self) -> usize {
        self.weights.len()
    }

    /// The full profit matrix
    pub fn profits(&self) -> &[Vec<i64>] {
        &self.profits
    }

    /// Profit entry `P[i][j]`
    #[inline]
    pub fn profit(&self, i: usize, j: usize) -> i64 {
        self.profits[i][j]
    }

    /// Item weights
    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    /// Knapsack capacity
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Check whether any off-diagonal profit is non-zero
    pub fn has_interactions(&self) -> bool {
        let n = self.num_items();
        (0..n).any(|i| ((i + 1)..n).any(|j| self.profits[i][j] != 0))
    }

    /// Total weight of a selection
    pub fn total_weight(&self, selection: &Bitstring) -> u64 {
        selection.total_weight(&self.weights)
    }

    /// Check the capacity constraint Σ wᵢ·bᵢ ≤ C
    pub fn is_feasible(&self, selection: &Bitstring) -> bool {
        selection.len() == self.num_items() && self.total_weight(selection) <= self.capacity
    }

    /// Objective value of a selection, computed from the profit matrix
    pub fn value(&self, selection: &Bitstring) -> i64 {
        let items: Vec<usize> = selection.selected().collect();
        let mut total = 0i64;
        for (k, &i) in items.iter().enumerate() {
            total += self.profits[i][i];
            for &j in &items[k + 1..] {
                total += self.profits[i][j];
            }
        }
        total
    }
}
