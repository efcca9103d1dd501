//! Decision trees underpinning the ensemble learners.
//!
//! Two flavors live here: a weighted classification tree whose leaves hold
//! class-probability distributions (random forest members and boosted
//! stumps), and a regression tree with multinomial Newton leaf values
//! (gradient boosting stages). Both split on midpoint thresholds chosen by
//! exhaustive scan over candidate features.
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index;

use crate::error::{Error, Result};

pub(crate) enum TreeNode {
    Leaf {
        distribution: Vec<f32>,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Split-search parameters for classification trees.
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Candidate features per split; `None` considers all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// Weighted classification tree with probability leaves.
pub(crate) struct ClassificationTree {
    root: TreeNode,
}

impl ClassificationTree {
    /// Grow a tree over `indices` into `x`/`y` with per-sample weights.
    /// Indices may repeat (bootstrap samples).
    pub fn fit(
        x: &Array2<f32>,
        y: &[usize],
        weights: &[f32],
        indices: &[usize],
        n_classes: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if x.nrows() != y.len() || y.len() != weights.len() {
            return Err(Error::Shape(
                "x, y and sample weights must have the same number of rows".into(),
            ));
        }
        if indices.is_empty() {
            return Err(Error::Shape("cannot grow a tree over zero samples".into()));
        }
        let root = build_classification(x, y, weights, indices, n_classes, 0, params, rng);
        Ok(ClassificationTree { root })
    }

    /// Leaf class distribution for a single sample.
    pub fn predict_distribution(&self, row: ArrayView1<f32>) -> &[f32] {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn weighted_class_counts(
    y: &[usize],
    weights: &[f32],
    indices: &[usize],
    n_classes: usize,
) -> (Vec<f32>, f32) {
    let mut counts = vec![0.0f32; n_classes];
    let mut total = 0.0f32;
    for &i in indices {
        counts[y[i]] += weights[i];
        total += weights[i];
    }
    (counts, total)
}

fn gini(counts: &[f32], total: f32) -> f32 {
    if total <= 0.0 {
        return 0.0;
    }
    let mut g = 1.0f32;
    for &c in counts {
        let p = c / total;
        g -= p * p;
    }
    g
}

fn leaf_from_counts(counts: Vec<f32>, total: f32) -> TreeNode {
    let n = counts.len() as f32;
    let distribution = if total > 0.0 {
        counts.into_iter().map(|c| c / total).collect()
    } else {
        vec![1.0 / n; n as usize]
    };
    TreeNode::Leaf { distribution }
}

#[allow(clippy::too_many_arguments)]
fn build_classification(
    x: &Array2<f32>,
    y: &[usize],
    weights: &[f32],
    indices: &[usize],
    n_classes: usize,
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> TreeNode {
    let (counts, total) = weighted_class_counts(y, weights, indices, n_classes);
    let parent_gini = gini(&counts, total);

    let depth_reached = params
        .max_depth
        .map(|max| depth >= max)
        .unwrap_or(false);
    if depth_reached || indices.len() < params.min_samples_split || parent_gini <= 0.0 {
        return leaf_from_counts(counts, total);
    }

    let n_features = x.ncols();
    let candidates: Vec<usize> = match params.max_features {
        Some(m) if m < n_features => index::sample(rng, n_features, m).into_vec(),
        _ => (0..n_features).collect(),
    };

    let mut best: Option<(usize, f32, f32)> = None; // (feature, threshold, child impurity)
    for &feature in &candidates {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_counts = vec![0.0f32; n_classes];
        let mut left_total = 0.0f32;
        for w in 0..order.len() - 1 {
            let i = order[w];
            left_counts[y[i]] += weights[i];
            left_total += weights[i];

            let here = x[[i, feature]];
            let next = x[[order[w + 1], feature]];
            if next <= here {
                continue;
            }

            let right_total = total - left_total;
            let right_counts: Vec<f32> = counts
                .iter()
                .zip(left_counts.iter())
                .map(|(c, l)| c - l)
                .collect();
            let impurity = (left_total * gini(&left_counts, left_total)
                + right_total * gini(&right_counts, right_total))
                / total;

            if best.map(|(_, _, b)| impurity < b).unwrap_or(true) {
                best = Some((feature, (here + next) / 2.0, impurity));
            }
        }
    }

    let Some((feature, threshold, impurity)) = best else {
        return leaf_from_counts(counts, total);
    };
    if parent_gini - impurity <= 1e-7 {
        return leaf_from_counts(counts, total);
    }

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[[i, feature]] <= threshold);
    if left_idx.is_empty() || right_idx.is_empty() {
        return leaf_from_counts(counts, total);
    }

    let left = build_classification(x, y, weights, &left_idx, n_classes, depth + 1, params, rng);
    let right = build_classification(x, y, weights, &right_idx, n_classes, depth + 1, params, rng);
    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

// ---------------------------------------------------------------------------
// Regression tree for gradient boosting stages
// ---------------------------------------------------------------------------

pub(crate) enum RegNode {
    Leaf {
        value: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<RegNode>,
        right: Box<RegNode>,
    },
}

/// Regression tree fit on one class's softmax pseudo-residuals. Leaves hold
/// the multinomial Newton step `(K-1)/K * sum(r) / sum(p * (1 - p))`.
pub(crate) struct GbmTree {
    root: RegNode,
}

impl GbmTree {
    pub fn fit(
        x: &Array2<f32>,
        residual: &[f32],
        prob: &[f32],
        indices: &[usize],
        n_classes: usize,
        max_depth: usize,
    ) -> Result<Self> {
        if x.nrows() != residual.len() || residual.len() != prob.len() {
            return Err(Error::Shape(
                "x, residuals and probabilities must have the same number of rows".into(),
            ));
        }
        if indices.is_empty() {
            return Err(Error::Shape("cannot grow a tree over zero samples".into()));
        }
        let root = build_regression(x, residual, prob, indices, n_classes as f32, 0, max_depth);
        Ok(GbmTree { root })
    }

    pub fn predict_row(&self, row: ArrayView1<f32>) -> f32 {
        let mut node = &self.root;
        loop {
            match node {
                RegNode::Leaf { value } => return *value,
                RegNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn newton_leaf(residual: &[f32], prob: &[f32], indices: &[usize], k: f32) -> RegNode {
    let mut numerator = 0.0f32;
    let mut denominator = 0.0f32;
    for &i in indices {
        numerator += residual[i];
        denominator += prob[i] * (1.0 - prob[i]);
    }
    let value = if denominator.abs() < 1e-10 {
        0.0
    } else {
        (k - 1.0) / k * numerator / denominator
    };
    RegNode::Leaf { value }
}

fn build_regression(
    x: &Array2<f32>,
    residual: &[f32],
    prob: &[f32],
    indices: &[usize],
    k: f32,
    depth: usize,
    max_depth: usize,
) -> RegNode {
    if depth >= max_depth || indices.len() < 2 {
        return newton_leaf(residual, prob, indices, k);
    }

    let n = indices.len() as f32;
    let total: f32 = indices.iter().map(|&i| residual[i]).sum();
    let parent_score = total * total / n;

    let mut best: Option<(usize, f32, f32)> = None; // (feature, threshold, score)
    for feature in 0..x.ncols() {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0f32;
        for w in 0..order.len() - 1 {
            let i = order[w];
            left_sum += residual[i];

            let here = x[[i, feature]];
            let next = x[[order[w + 1], feature]];
            if next <= here {
                continue;
            }

            let n_left = (w + 1) as f32;
            let n_right = n - n_left;
            let right_sum = total - left_sum;
            // Maximizing this score minimizes the split's squared error.
            let score = left_sum * left_sum / n_left + right_sum * right_sum / n_right;
            if best.map(|(_, _, b)| score > b).unwrap_or(true) {
                best = Some((feature, (here + next) / 2.0, score));
            }
        }
    }

    let Some((feature, threshold, score)) = best else {
        return newton_leaf(residual, prob, indices, k);
    };
    if score - parent_score <= 1e-9 {
        return newton_leaf(residual, prob, indices, k);
    }

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[[i, feature]] <= threshold);
    if left_idx.is_empty() || right_idx.is_empty() {
        return newton_leaf(residual, prob, indices, k);
    }

    let left = build_regression(x, residual, prob, &left_idx, k, depth + 1, max_depth);
    let right = build_regression(x, residual, prob, &right_idx, k, depth + 1, max_depth);
    RegNode::Split {
        feature,
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}
