//! Seeded random QKP instances
//!
//! Profits are symmetric; each entry (diagonal included) is non-zero with
//! probability `density`% and then uniform in `[1, range]`. Weights are
//! uniform in `[1, max(range/2, 1)]`, and the capacity is uniform in
//! `[50, Σw − 1]`.

use crate::error::{Error, Result};
use crate::instance::Instance;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Largest supported instance
pub const MAX_ITEMS: usize = 400;

/// Smallest capacity a generated instance can have
pub const MIN_CAPACITY: u64 = 50;

/// Parameters of the random generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    /// Number of items
    pub items: usize,
    /// Upper bound of profit coefficients
    pub range: u32,
    /// Percentage of non-zero profit entries (0-100)
    pub density: u32,
    pub seed: u64,
}

impl GeneratorConfig {
    pub fn new(items: usize, range: u32, density: u32, seed: u64) -> Self {
        Self {
            items,
            range,
            density,
            seed,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.items == 0 || self.items > MAX_ITEMS {
            return Err(Error::Construction(format!(
                "Item count must be in [1, {}], got {}",
                MAX_ITEMS, self.items
            )));
        }
        if self.range == 0 {
            return Err(Error::Construction("Coefficient range must be at least 1".into()));
        }
        if self.density > 100 {
            return Err(Error::Construction(format!(
                "Density is a percentage, got {}",
                self.density
            )));
        }
        Ok(())
    }
}

/// Draw a random instance
///
/// # Errors
/// Returns a construction error if the parameters are out of range or the
/// drawn weights sum to at most [`MIN_CAPACITY`]
pub fn generate_instance(config: &GeneratorConfig) -> Result<Instance> {
    config.validate()?;
    let n = config.items;
    let mut rng = SmallRng::seed_from_u64(config.seed);

    let mut profits = vec![vec![0i64; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let value = if rng.gen_range(0..100) < config.density {
                rng.gen_range(1..=config.range as i64)
            } else {
                0
            };
            profits[i][j] = value;
            profits[j][i] = value;
        }
    }

    let max_weight = (config.range / 2).max(1) as i64;
    let weights: Vec<i64> = (0..n).map(|_| rng.gen_range(1..=max_weight)).collect();

    let total: i64 = weights.iter().sum();
    if total <= MIN_CAPACITY as i64 {
        return Err(Error::Construction(format!(
            "Total weight {} is too small to draw a capacity of at least {}",
            total, MIN_CAPACITY
        )));
    }
    let capacity = rng.gen_range(MIN_CAPACITY as i64..total);

    Instance::new(n, profits, weights, capacity)
}
