//! Boosted-stump ensemble with the real-valued (SAMME.R) update rule.
//!
//! Each round fits a depth-1 weighted probability stump, accumulates the
//! real-valued class scores
//! `h_k(x) = (K-1) * (ln p_k(x) - mean_j ln p_j(x))`
//! and reweights samples by `exp(-(K-1)/K * y_code . ln p(x))`, where
//! `y_code` is 1 for the true class and `-1/(K-1)` elsewhere.
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::models::classifier::Classifier;
use crate::models::tree::{ClassificationTree, TreeParams};

/// Probability floor applied before taking logarithms.
const PROBA_EPS: f32 = 1e-10;

pub struct AdaBoost {
    n_estimators: usize,
    seed: u64,
    stumps: Vec<ClassificationTree>,
    n_classes: usize,
}

impl AdaBoost {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        AdaBoost {
            n_estimators,
            seed,
            stumps: Vec::new(),
            n_classes: 0,
        }
    }

    /// Real-valued contribution of one stump for one sample.
    fn stump_scores(stump: &ClassificationTree, row: ArrayView1<f32>, k: f32) -> Vec<f32> {
        let log_proba: Vec<f32> = stump
            .predict_distribution(row)
            .iter()
            .map(|&p| p.max(PROBA_EPS).ln())
            .collect();
        let mean = log_proba.iter().sum::<f32>() / k;
        log_proba.iter().map(|&l| (k - 1.0) * (l - mean)).collect()
    }

    fn decision(&self, x: &Array2<f32>) -> Array2<f32> {
        let k = self.n_classes as f32;
        let mut scores = Array2::zeros((x.nrows(), self.n_classes));
        for (r, row) in x.rows().into_iter().enumerate() {
            for stump in &self.stumps {
                for (c, s) in Self::stump_scores(stump, row, k).into_iter().enumerate() {
                    scores[[r, c]] += s;
                }
            }
        }
        scores
    }
}

impl Classifier for AdaBoost {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(Error::Shape("x and y row counts differ".into()));
        }
        self.n_classes = n_classes;
        self.stumps = Vec::with_capacity(self.n_estimators);

        let k = n_classes as f32;
        let all_indices: Vec<usize> = (0..n_samples).collect();
        let mut weights = vec![1.0f32 / n_samples as f32; n_samples];
        let params = TreeParams {
            max_depth: Some(1),
            min_samples_split: 2,
            max_features: None,
        };
        let mut rng = StdRng::seed_from_u64(self.seed);

        for _round in 0..self.n_estimators {
            let stump =
                ClassificationTree::fit(x, y, &weights, &all_indices, n_classes, &params, &mut rng)?;

            // SAMME.R weight update; the coding vector is 1 for the true
            // class and -1/(K-1) for every other class.
            let mut sum = 0.0f32;
            for (i, row) in x.rows().into_iter().enumerate() {
                let log_proba: Vec<f32> = stump
                    .predict_distribution(row)
                    .iter()
                    .map(|&p| p.max(PROBA_EPS).ln())
                    .collect();
                let mut coded = 0.0f32;
                for (c, &l) in log_proba.iter().enumerate() {
                    let code = if c == y[i] { 1.0 } else { -1.0 / (k - 1.0) };
                    coded += code * l;
                }
                weights[i] *= (-(k - 1.0) / k * coded).exp();
                sum += weights[i];
            }
            if !(sum.is_finite() && sum > 0.0) {
                self.stumps.push(stump);
                break;
            }
            for w in weights.iter_mut() {
                *w /= sum;
            }
            self.stumps.push(stump);
        }
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if self.stumps.is_empty() {
            return Err(Error::NotFitted);
        }
        let k = self.n_classes as f32;
        let mut scores = self.decision(x);
        // Softmax of the decision scaled by 1/(K-1).
        for mut row in scores.rows_mut() {
            let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let mut sum = 0.0f32;
            for v in row.iter_mut() {
                *v = ((*v - max) / (k - 1.0).max(1.0)).exp();
                sum += *v;
            }
            for v in row.iter_mut() {
                *v /= sum;
            }
        }
        Ok(scores)
    }

    fn name(&self) -> &str {
        "AdaBoost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{blobs, train_accuracy};

    #[test]
    fn fits_separable_blobs() {
        let (x, y) = blobs(3, 20, 7);
        let mut ab = AdaBoost::new(30, 42);
        ab.fit(&x, &y, 3).unwrap();
        assert!(train_accuracy(&ab, &x, &y) > 0.9);
    }

    #[test]
    fn binary_case_degrades_gracefully() {
        let (x, y) = blobs(2, 15, 7);
        let mut ab = AdaBoost::new(10, 1);
        ab.fit(&x, &y, 2).unwrap();
        let proba = ab.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
        }
    }
}
