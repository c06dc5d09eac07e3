//! Random forest: bagged Gini trees with per-split feature subsampling.
//!
//! Each tree draws its bootstrap sample and feature subsets from its own
//! RNG stream (`Stage::Forest`, tree index), so the forest is a pure
//! function of (training rows, seed, config).

use super::tree::{DecisionTree, TreeParams};
use crate::rng::{SeedHierarchy, Stage};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` means floor(sqrt(width)).
    pub max_features: Option<usize>,
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    fn tree_params(&self, width: usize) -> TreeParams {
        let sqrt = (width as f64).sqrt().floor() as usize;
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.unwrap_or(sqrt).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on non-empty `x`/`y` of equal length.
    pub(crate) fn fit(
        x: &[Vec<f64>],
        y: &[bool],
        config: &ForestConfig,
        seeds: &SeedHierarchy,
    ) -> Self {
        let n = x.len();
        let width = x.first().map_or(0, Vec::len);
        let params = config.tree_params(width);

        let trees = (0..config.n_trees.max(1))
            .map(|t| {
                let mut rng = seeds.rng_for(Stage::Forest, t as u64);
                let sample: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, y, sample, &params, &mut rng)
            })
            .collect();

        Self { trees }
    }

    /// Mean of the per-tree up-class probabilities.
    pub fn prob_up(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        self.trees.iter().map(|t| t.prob_up(row)).sum::<f64>() / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
