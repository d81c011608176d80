//! Capacity-aware include/exclude decision tree (the QTG)
//!
//! The tree walks items in index order. At depth `i` an item may be included
//! only if its weight fits into the remaining capacity; otherwise the only
//! admissible decision is to exclude it. Every root-to-leaf path is therefore
//! a feasible selection, and every feasible selection is exactly one leaf.
//!
//! Traversal uses an explicit stack over an arena of [`TreeNode`]s, so deep
//! instances never exhaust the call stack.

use crate::bitstring::Bitstring;
use crate::distribution::FeasibleDistribution;
use crate::error::{Error, Result};
use crate::instance::Instance;
use std::collections::BTreeMap;
use tracing::debug;

/// Tilts each two-way branch toward a reference selection
///
/// With strength `b`, the branch agreeing with the reference bit gets
/// probability `(1+b)/(2+b)` and the other `1/(2+b)`. `b = 0` is the
/// unbiased tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeBias {
    reference: Bitstring,
    strength: f64,
}

impl TreeBias {
    /// Create a bias toward `reference`
    ///
    /// # Errors
    /// Returns a construction error if the strength is negative or not finite
    pub fn new(reference: Bitstring, strength: f64) -> Result<Self> {
        if !strength.is_finite() || strength < 0.0 {
            return Err(Error::Construction(format!(
                "Bias strength must be non-negative, got {}",
                strength
            )));
        }
        Ok(Self {
            reference,
            strength,
        })
    }

    pub fn reference(&self) -> &Bitstring {
        &self.reference
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Probability of taking `bit` at `depth` when both decisions are admissible
    fn branch_probability(&self, depth: usize, bit: bool) -> f64 {
        let preferred = self.reference.get(depth).unwrap_or(false);
        if bit == preferred {
            (1.0 + self.strength) / (2.0 + self.strength)
        } else {
            1.0 / (2.0 + self.strength)
        }
    }
}

/// One node of the decision tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Arena index of the parent (`None` for the root)
    pub parent: Option<usize>,
    /// Decision taken on the edge into this node (`false` for the root)
    pub bit: bool,
    /// Number of decided items
    pub depth: usize,
    /// Capacity left after the decisions on the path
    pub remaining: u64,
    /// Product of branch probabilities from the root
    pub probability: f64,
    /// Feasible leaves below this node (1 for a leaf)
    pub feasible_leaves: u64,
}

/// Fully expanded decision tree
#[derive(Debug, Clone)]
pub struct FeasibleTree {
    num_items: usize,
    nodes: Vec<TreeNode>,
    leaves: Vec<usize>,
}

impl FeasibleTree {
    /// All nodes, root first, each parent before its children
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Arena indices of the leaves in traversal order
    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    /// Number of feasible selections
    pub fn num_feasible(&self) -> u64 {
        self.nodes.first().map_or(0, |root| root.feasible_leaves)
    }

    /// Reconstruct the selection of a node by following parent links
    pub fn path(&self, node: usize) -> Bitstring {
        let mut bits = vec![false; self.num_items];
        let mut cursor = Some(node);
        while let Some(idx) = cursor {
            let n = &self.nodes[idx];
            if n.depth > 0 {
                bits[n.depth - 1] = n.bit;
            }
            cursor = n.parent;
        }
        Bitstring::from_bits(bits)
    }

    /// Iterate over (selection, path probability) for every leaf
    pub fn leaf_paths(&self) -> impl Iterator<Item = (Bitstring, f64)> + '_ {
        self.leaves
            .iter()
            .map(move |&idx| (self.path(idx), self.nodes[idx].probability))
    }
}

/// Builds the weighted feasible set of a knapsack constraint
///
/// # Example
/// ```
/// use qtg_core::FeasibleDistributionGenerator;
///
/// let generator = FeasibleDistributionGenerator::new(vec![2, 3, 4], 5).unwrap();
/// let dist = generator.generate().unwrap();
/// assert_eq!(dist.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct FeasibleDistributionGenerator {
    weights: Vec<u64>,
    capacity: u64,
    uniform: bool,
    bias: Option<TreeBias>,
}

impl FeasibleDistributionGenerator {
    /// Create a generator from raw weights and capacity
    ///
    /// # Errors
    /// Returns a construction error on a negative weight or capacity
    pub fn new(weights: Vec<i64>, capacity: i64) -> Result<Self> {
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
            weights,
            capacity,
            uniform: false,
            bias: None,
        })
    }

    /// Create a generator for the constraint of a validated instance
    pub fn for_instance(instance: &Instance) -> Self {
        Self {
            weights: instance.weights().to_vec(),
            capacity: instance.capacity(),
            uniform: false,
            bias: None,
        }
    }

    /// Give every feasible selection the same weight
    pub fn uniform(mut self, uniform: bool) -> Self {
        self.uniform = uniform;
        self
    }

    /// Tilt two-way branches toward a reference selection
    ///
    /// # Errors
    /// Returns a construction error if the reference length differs from the
    /// number of items
    pub fn with_bias(mut self, bias: TreeBias) -> Result<Self> {
        if bias.reference.len() != self.weights.len() {
            return Err(Error::Construction(format!(
                "Bias reference has {} bits, expected {}",
                bias.reference.len(),
                self.weights.len()
            )));
        }
        self.bias = Some(bias);
        Ok(self)
    }

    pub fn num_items(&self) -> usize {
        self.weights.len()
    }

    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    fn branch_probability(&self, depth: usize, bit: bool, admissible: usize) -> f64 {
        if admissible == 1 {
            return 1.0;
        }
        match &self.bias {
            Some(bias) => bias.branch_probability(depth, bit),
            None => 0.5,
        }
    }

    /// Expand the full decision tree
    pub fn build_tree(&self) -> FeasibleTree {
        let n = self.weights.len();
        let mut nodes = vec![TreeNode {
            parent: None,
            bit: false,
            depth: 0,
            remaining: self.capacity,
            probability: 1.0,
            feasible_leaves: 0,
        }];
        let mut leaves = Vec::new();
        let mut stack = vec![0usize];

        while let Some(idx) = stack.pop() {
            let (depth, remaining, probability) = {
                let node = &nodes[idx];
                (node.depth, node.remaining, node.probability)
            };
            if depth == n {
                leaves.push(idx);
                continue;
            }

            let weight = self.weights[depth];
            let admissible = if weight <= remaining { 2 } else { 1 };

            // Push the include branch first so the exclude branch is expanded
            // first and leaves come out in bit-string order.
            if admissible == 2 {
                let child = nodes.len();
                nodes.push(TreeNode {
                    parent: Some(idx),
                    bit: true,
                    depth: depth + 1,
                    remaining: remaining - weight,
                    probability: probability * self.branch_probability(depth, true, 2),
                    feasible_leaves: 0,
                });
                stack.push(child);
            }
            let child = nodes.len();
            nodes.push(TreeNode {
                parent: Some(idx),
                bit: false,
                depth: depth + 1,
                remaining,
                probability: probability * self.branch_probability(depth, false, admissible),
                feasible_leaves: 0,
            });
            stack.push(child);
        }

        // Children always sit after their parent in the arena, so a reverse
        // sweep accumulates subtree counts bottom-up.
        for &leaf in &leaves {
            nodes[leaf].feasible_leaves = 1;
        }
        for idx in (1..nodes.len()).rev() {
            let count = nodes[idx].feasible_leaves;
            if let Some(parent) = nodes[idx].parent {
                nodes[parent].feasible_leaves += count;
            }
        }

        FeasibleTree {
            num_items: n,
            nodes,
            leaves,
        }
    }

    /// Generate the normalized feasible distribution
    ///
    /// # Errors
    /// Returns [`Error::EmptyDistribution`] if no feasible leaf exists
    pub fn generate(&self) -> Result<FeasibleDistribution> {
        let tree = self.build_tree();
        let count = tree.num_feasible();
        if count == 0 {
            return Err(Error::EmptyDistribution {
                capacity: self.capacity,
            });
        }

        let mut weights = BTreeMap::new();
        if self.uniform {
            let share = 1.0 / count as f64;
            for (bits, _) in tree.leaf_paths() {
                weights.insert(bits, share);
            }
        } else {
            for (bits, probability) in tree.leaf_paths() {
                weights.insert(bits, probability);
            }
        }
        debug!(
            items = self.weights.len(),
            capacity = self.capacity,
            feasible = count,
            nodes = tree.nodes().len(),
            uniform = self.uniform,
            "Generated feasible distribution"
        );

        FeasibleDistribution::from_map(self.weights.len(), weights).normalized()
    }
}
