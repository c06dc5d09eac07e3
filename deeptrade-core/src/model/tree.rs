//! Binary classification tree grown on Gini impurity.
//!
//! Nodes live in a flat arena; index 0 is the root. Leaves store the
//! fraction of "up" samples that reached them, which is the tree's
//! probability estimate for the up class.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        prob_up: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered at each split.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

fn gini(ups: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = ups as f64 / n as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

impl DecisionTree {
    /// Grow a tree over the rows of `x` selected by `sample` (indices may
    /// repeat for bootstrap draws). `sample` must be non-empty.
    pub(crate) fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[bool],
        sample: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, sample, 0, params, rng);
        tree
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn grow<R: Rng>(
        &mut self,
        x: &[Vec<f64>],
        y: &[bool],
        idx: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> usize {
        let n = idx.len();
        let ups = idx.iter().filter(|&&i| y[i]).count();
        let prob_up = if n == 0 { 0.5 } else { ups as f64 / n as f64 };
        let leaf = Node::Leaf { prob_up };

        let pure = ups == 0 || ups == n;
        let too_deep = params.max_depth.is_some_and(|d| depth >= d);
        if pure || too_deep || n < params.min_samples_split.max(2) {
            return self.push(leaf);
        }

        let Some((feature, threshold)) = best_split(x, y, &idx, ups, params, rng) else {
            return self.push(leaf);
        };
        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            idx.iter().partition(|&&i| x[i][feature] <= threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return self.push(leaf);
        }

        let id = self.push(leaf);
        let left = self.grow(x, y, left_idx, depth + 1, params, rng);
        let right = self.grow(x, y, right_idx, depth + 1, params, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Probability of the up class for one (scaled) row.
    pub fn prob_up(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(Node::Leaf { prob_up }) => return *prob_up,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    id = if v <= *threshold { *left } else { *right };
                }
                None => return 0.5,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes.get(id) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Lowest weighted-Gini split over a random subset of features, if any split
/// improves on the parent. Thresholds are midpoints between adjacent
/// distinct values.
fn best_split<R: Rng>(
    x: &[Vec<f64>],
    y: &[bool],
    idx: &[usize],
    ups: usize,
    params: &TreeParams,
    rng: &mut R,
) -> Option<(usize, f64)> {
    let n = idx.len();
    let width = x.get(idx[0]).map_or(0, Vec::len);
    let mut features: Vec<usize> = (0..width).collect();
    features.shuffle(rng);
    features.truncate(params.max_features.clamp(1, width.max(1)));

    let parent = gini(ups, n);
    let min_leaf = params.min_samples_leaf.max(1);
    let mut best: Option<(usize, f64, f64)> = None;
    let mut order = idx.to_vec();

    for &f in &features {
        order.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]));
        let mut left_ups = 0;
        for k in 1..n {
            if y[order[k - 1]] {
                left_ups += 1;
            }
            let (lo, hi) = (x[order[k - 1]][f], x[order[k]][f]);
            if lo >= hi || k < min_leaf || n - k < min_leaf {
                continue;
            }
            let impurity = (k as f64 * gini(left_ups, k)
                + (n - k) as f64 * gini(ups - left_ups, n - k))
                / n as f64;
            if best.map_or(true, |(_, _, b)| impurity < b) {
                best = Some((f, lo + (hi - lo) / 2.0, impurity));
            }
        }
    }

    best.filter(|&(_, _, imp)| imp < parent - 1e-12)
        .map(|(f, t, _)| (f, t))
}
