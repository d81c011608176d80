//! Item selections as ordered bit sequences
//!
//! A [`Bitstring`] stores one bit per item in item order: bit `i` is set when
//! item `i` is placed in the knapsack. The text form lists item 0 first, so
//! `"110"` selects items 0 and 1.
//!
//! Simulation backends address basis states by integer index. The mapping is
//! fixed to little-endian qubit order: bit `i` of the selection is bit `i` of
//! the basis index. [`Bitstring::from_index`] and [`Bitstring::to_index`] are
//! the only conversions between the two views.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// An ordered selection of `n` items
///
/// Ordering is lexicographic on the item-order text form (`"000" < "001"`),
/// which gives a fixed tie-breaking order for solution extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bitstring {
    bits: Vec<bool>,
}

impl Bitstring {
    /// The empty selection over `num_items` items
    pub fn zeros(num_items: usize) -> Self {
        Self {
            bits: vec![false; num_items],
        }
    }

    /// Build a selection from explicit bits in item order
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Build a selection from the listed item indices
    ///
    /// # Errors
    /// Returns a construction error if an index is out of range
    pub fn from_items(num_items: usize, items: &[usize]) -> Result<Self> {
        let mut bits = vec![false; num_items];
        for &item in items {
            if item >= num_items {
                return Err(Error::Construction(format!(
                    "Item {} is out of bounds for {} items",
                    item, num_items
                )));
            }
            bits[item] = true;
        }
        Ok(Self { bits })
    }

    /// Decode a basis-state index of a register with at least `num_items` qubits
    ///
    /// Only the lowest `num_items` bits are read; higher (padding) positions
    /// are ignored.
    pub fn from_index(index: u64, num_items: usize) -> Self {
        debug_assert!(num_items <= 64);
        let bits = (0..num_items).map(|i| (index >> i) & 1 == 1).collect();
        Self { bits }
    }

    /// Encode as a basis-state index (little-endian qubit order)
    pub fn to_index(&self) -> u64 {
        debug_assert!(self.bits.len() <= 64);
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit)
            .fold(0u64, |acc, (i, _)| acc | (1u64 << i))
    }

    /// Number of items covered by this selection
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if the selection covers no items at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get the bit for a specific item
    #[inline]
    pub fn get(&self, item: usize) -> Option<bool> {
        self.bits.get(item).copied()
    }

    /// Return a copy with the bit for `item` replaced
    ///
    /// # Panics
    /// Panics if `item >= self.len()`
    pub fn with_bit(mut self, item: usize, value: bool) -> Self {
        self.bits[item] = value;
        self
    }

    /// The bits in item order
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Indices of the selected items
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit)
            .map(|(i, _)| i)
    }

    /// Number of selected items
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Check whether no item is selected
    pub fn is_zero(&self) -> bool {
        self.bits.iter().all(|&b| !b)
    }

    /// Total weight of the selection, Σ wᵢ·bᵢ
    pub fn total_weight(&self, weights: &[u64]) -> u64 {
        self.selected().map(|i| weights[i]).sum()
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl FromStr for Bitstring {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .trim()
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(Error::Construction(format!(
                    "Invalid character {:?} in bit-string {:?}",
                    other, s
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bits })
    }
}
