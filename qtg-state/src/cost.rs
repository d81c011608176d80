//! Diagonal cost operator of the quadratic knapsack objective
//!
//! With `bᵢ = (1 − zᵢ)/2` the negative objective expands into a constant, a
//! linear `Z` part and a quadratic `ZZ` part:
//!
//! - `−Pᵢᵢ·bᵢ = −Pᵢᵢ/2 + (Pᵢᵢ/2)·zᵢ`
//! - `−Pᵢⱼ·bᵢ·bⱼ = −Pᵢⱼ/4·(1 − zᵢ − zⱼ + zᵢzⱼ)` for `i < j`
//!
//! The constant is kept so that the energy of every basis state equals the
//! negative objective value exactly.

use crate::dense_state::DenseState;
use crate::error::{Result, StateError};
use qtg_core::{check_profit_matrix, Bitstring, Instance};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Coefficients below this magnitude are dropped
pub const COEFFICIENT_CUTOFF: f64 = 1e-8;

/// A Pauli-Z product term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZTerm {
    /// `Z(i)`
    Single(usize),
    /// `Z(i)·Z(j)` with `i < j`
    Pair(usize, usize),
}

impl ZTerm {
    /// Eigenvalue of the term on a basis state (`z = +1` for bit 0)
    #[inline]
    fn eigenvalue(&self, index: u64) -> f64 {
        let z = |q: usize| if (index >> q) & 1 == 0 { 1.0 } else { -1.0 };
        match *self {
            ZTerm::Single(i) => z(i),
            ZTerm::Pair(i, j) => z(i) * z(j),
        }
    }

    fn max_qubit(&self) -> usize {
        match *self {
            ZTerm::Single(i) => i,
            ZTerm::Pair(_, j) => j,
        }
    }
}

impl fmt::Display for ZTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZTerm::Single(i) => write!(f, "Z({})", i),
            ZTerm::Pair(i, j) => write!(f, "ZZ({},{})", i, j),
        }
    }
}

/// Sparse diagonal operator `offset + Σ c·term`
#[derive(Debug, Clone, PartialEq)]
pub struct CostOperator {
    num_items: usize,
    width: usize,
    offset: f64,
    terms: BTreeMap<ZTerm, f64>,
}

impl CostOperator {
    /// Build the operator from a profit matrix
    ///
    /// Only the diagonal and the upper triangle are read.
    ///
    /// # Errors
    /// Returns a construction error if the matrix is not square or its size
    /// differs from `num_items`
    pub fn from_profits<R: AsRef<[i64]>>(num_items: usize, profits: &[R]) -> qtg_core::Result<Self> {
        check_profit_matrix(num_items, profits)?;
        let op = Self::expand(num_items, |i, j| profits[i].as_ref()[j]);
        debug!(
            items = num_items,
            terms = op.terms.len(),
            pairs = op.num_pair_terms(),
            offset = op.offset,
            "Built cost operator"
        );
        Ok(op)
    }

    /// Build the operator of a validated instance
    pub fn from_instance(instance: &Instance) -> Self {
        Self::expand(instance.num_items(), |i, j| instance.profit(i, j))
    }

    fn expand(num_items: usize, profit: impl Fn(usize, usize) -> i64) -> Self {
        let mut offset = 0.0;
        let mut terms: BTreeMap<ZTerm, f64> = BTreeMap::new();

        for i in 0..num_items {
            let p = profit(i, i) as f64;
            offset -= p / 2.0;
            *terms.entry(ZTerm::Single(i)).or_insert(0.0) += p / 2.0;

            for j in (i + 1)..num_items {
                let q = profit(i, j) as f64 / 4.0;
                offset -= q;
                *terms.entry(ZTerm::Single(i)).or_insert(0.0) += q;
                *terms.entry(ZTerm::Single(j)).or_insert(0.0) += q;
                *terms.entry(ZTerm::Pair(i, j)).or_insert(0.0) -= q;
            }
        }
        terms.retain(|_, c| c.abs() >= COEFFICIENT_CUTOFF);

        Self {
            num_items,
            width: num_items,
            offset,
            terms,
        }
    }

    /// Number of items the operator acts on
    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Register width (≥ number of items)
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Constant part
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Coefficient of a term (0 if absent)
    pub fn coefficient(&self, term: ZTerm) -> f64 {
        self.terms.get(&term).copied().unwrap_or(0.0)
    }

    /// Non-zero terms in order
    pub fn terms(&self) -> impl Iterator<Item = (ZTerm, f64)> + '_ {
        self.terms.iter().map(|(&t, &c)| (t, c))
    }

    /// Number of `ZZ` terms
    pub fn num_pair_terms(&self) -> usize {
        self.terms
            .keys()
            .filter(|t| matches!(t, ZTerm::Pair(..)))
            .count()
    }

    /// Identity-pad the operator to a wider register
    ///
    /// # Errors
    /// Returns error if `width` is smaller than the number of items
    pub fn extend(&self, width: usize) -> Result<Self> {
        if width < self.num_items {
            return Err(StateError::DimensionMismatch {
                expected: self.num_items,
                actual: width,
            });
        }
        let mut op = self.clone();
        op.width = width;
        Ok(op)
    }

    /// Eigenvalue on a basis state
    pub fn energy(&self, index: u64) -> f64 {
        self.offset
            + self
                .terms
                .iter()
                .map(|(t, c)| c * t.eigenvalue(index))
                .sum::<f64>()
    }

    /// Eigenvalue on the basis state of a selection
    pub fn energy_of(&self, selection: &Bitstring) -> f64 {
        self.energy(selection.to_index())
    }

    /// All `2^width` eigenvalues in basis-index order
    pub fn diagonal(&self) -> Vec<f64> {
        let dim = 1usize << self.width;
        let mut diag = vec![self.offset; dim];
        for (&term, &c) in &self.terms {
            debug_assert!(term.max_qubit() < self.width);
            for (k, d) in diag.iter_mut().enumerate() {
                *d += c * term.eigenvalue(k as u64);
            }
        }
        diag
    }

    /// Expectation value on a state of the operator's width
    ///
    /// # Errors
    /// Returns error if the state's width differs from the operator's
    pub fn expectation_value(&self, state: &DenseState) -> Result<f64> {
        if state.num_qubits() != self.width {
            return Err(StateError::DimensionMismatch {
                expected: self.width,
                actual: state.num_qubits(),
            });
        }
        state.expectation_value(&self.diagonal())
    }
}

impl fmt::Display for CostOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.offset)?;
        for (term, c) in &self.terms {
            write!(f, " {:+}·{}", c, term)?;
        }
        Ok(())
    }
}
