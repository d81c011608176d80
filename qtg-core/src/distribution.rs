//! Weighted sets of feasible selections

use crate::bitstring::Bitstring;
use crate::error::{Error, Result};
use crate::instance::Instance;
use std::collections::BTreeMap;

/// Mapping from selection to non-negative weight
///
/// All keys share the same length. Distributions produced by
/// [`FeasibleDistributionGenerator`](crate::tree::FeasibleDistributionGenerator)
/// only contain feasible keys and are already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibleDistribution {
    num_items: usize,
    weights: BTreeMap<Bitstring, f64>,
}

impl FeasibleDistribution {
    /// Build a distribution from explicit entries
    ///
    /// Repeated keys accumulate their weights.
    ///
    /// # Errors
    /// Returns a construction error if the input is empty, a key has the
    /// wrong length, or a weight is negative or not finite
    pub fn from_entries<I>(num_items: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Bitstring, f64)>,
    {
        let mut weights = BTreeMap::new();
        for (bits, weight) in entries {
            if bits.len() != num_items {
                return Err(Error::Construction(format!(
                    "All bit-strings must have equal length: {} has {} bits, expected {}",
                    bits,
                    bits.len(),
                    num_items
                )));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Construction(format!(
                    "Weight of {} must be non-negative, got {}",
                    bits, weight
                )));
            }
            *weights.entry(bits).or_insert(0.0) += weight;
        }
        if weights.is_empty() {
            return Err(Error::Construction("Feasible set must not be empty".into()));
        }
        Ok(Self { num_items, weights })
    }

    pub(crate) fn from_map(num_items: usize, weights: BTreeMap<Bitstring, f64>) -> Self {
        Self { num_items, weights }
    }

    /// Number of items per selection
    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Number of selections with an entry
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Check if the distribution has no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight of a selection, if present
    pub fn get(&self, bits: &Bitstring) -> Option<f64> {
        self.weights.get(bits).copied()
    }

    /// Check if a selection has an entry
    pub fn contains(&self, bits: &Bitstring) -> bool {
        self.weights.contains_key(bits)
    }

    /// Entries in bit-string order
    pub fn iter(&self) -> impl Iterator<Item = (&Bitstring, f64)> {
        self.weights.iter().map(|(b, &w)| (b, w))
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Normalized probability of a selection (0 if absent)
    pub fn probability(&self, bits: &Bitstring) -> f64 {
        let total = self.total_weight();
        if total <= 0.0 {
            return 0.0;
        }
        self.get(bits).unwrap_or(0.0) / total
    }

    /// Copy with weights rescaled to sum to 1
    ///
    /// # Errors
    /// Returns a construction error if every weight is zero
    pub fn normalized(&self) -> Result<Self> {
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(Error::Construction(
                "At least one weight must be greater than zero".into(),
            ));
        }
        let weights = self
            .weights
            .iter()
            .map(|(b, &w)| (b.clone(), w / total))
            .collect();
        Ok(Self::from_map(self.num_items, weights))
    }

    /// Copy with equal weight on every key
    pub fn uniformized(&self) -> Self {
        let share = 1.0 / self.weights.len().max(1) as f64;
        let weights = self.weights.keys().map(|b| (b.clone(), share)).collect();
        Self::from_map(self.num_items, weights)
    }

    /// Check every key against the instance's capacity constraint
    pub fn is_feasible_for(&self, instance: &Instance) -> bool {
        self.num_items == instance.num_items()
            && self.weights.keys().all(|b| instance.is_feasible(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bits(s: &str) -> Bitstring {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalize_and_uniformize() {
        let dist = FeasibleDistribution::from_entries(
            2,
            vec![(bits("00"), 1.0), (bits("10"), 3.0)],
        )
        .unwrap();
        let norm = dist.normalized().unwrap();
        assert_relative_eq!(norm.total_weight(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(norm.get(&bits("10")).unwrap(), 0.75, epsilon = 1e-12);

        let uni = dist.uniformized();
        assert_relative_eq!(uni.get(&bits("00")).unwrap(), 0.5);
        assert_relative_eq!(uni.get(&bits("10")).unwrap(), 0.5);
    }

    #[test]
    fn test_repeated_keys_accumulate() {
        let dist = FeasibleDistribution::from_entries(
            1,
            vec![(bits("1"), 0.25), (bits("1"), 0.25), (bits("0"), 0.5)],
        )
        .unwrap();
        assert_eq!(dist.len(), 2);
        assert_relative_eq!(dist.probability(&bits("1")), 0.5);
    }

    #[test]
    fn test_rejects_bad_entries() {
        assert!(FeasibleDistribution::from_entries(2, Vec::new()).is_err());
        assert!(FeasibleDistribution::from_entries(2, vec![(bits("0"), 1.0)]).is_err());
        assert!(FeasibleDistribution::from_entries(1, vec![(bits("0"), -1.0)]).is_err());
        assert!(FeasibleDistribution::from_entries(1, vec![(bits("0"), f64::NAN)]).is_err());

        let zero = FeasibleDistribution::from_entries(1, vec![(bits("0"), 0.0)]).unwrap();
        assert!(zero.normalized().is_err());
    }
}
