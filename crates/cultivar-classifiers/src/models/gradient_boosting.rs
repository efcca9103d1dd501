//! Multiclass gradient boosting with softmax deviance.
//!
//! Each stage fits one regression tree per class on the softmax
//! pseudo-residuals and applies the shrunken Newton leaf values. Raw scores
//! start at the per-class log priors. Split search is deterministic, so no
//! randomness is involved beyond what the trees do not have.
use ndarray::Array2;

use crate::error::{Error, Result};
use crate::models::classifier::Classifier;
use crate::models::tree::GbmTree;

pub struct GradientBoosting {
    n_estimators: usize,
    learning_rate: f32,
    max_depth: usize,
    init_scores: Vec<f32>,
    /// `stages[m][k]` is the stage-m tree for class k.
    stages: Vec<Vec<GbmTree>>,
    n_classes: usize,
}

impl GradientBoosting {
    pub fn new(n_estimators: usize, learning_rate: f32, max_depth: usize) -> Self {
        GradientBoosting {
            n_estimators,
            learning_rate,
            max_depth,
            init_scores: Vec::new(),
            stages: Vec::new(),
            n_classes: 0,
        }
    }

    /// Row-wise softmax over raw scores, in place.
    fn softmax_rows(scores: &mut Array2<f32>) {
        for mut row in scores.rows_mut() {
            let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let mut sum = 0.0f32;
            for v in row.iter_mut() {
                *v = (*v - max).exp();
                sum += *v;
            }
            for v in row.iter_mut() {
                *v /= sum;
            }
        }
    }

    fn raw_scores(&self, x: &Array2<f32>) -> Array2<f32> {
        let n_samples = x.nrows();
        let mut scores = Array2::zeros((n_samples, self.n_classes));
        for mut row in scores.rows_mut() {
            for (k, init) in self.init_scores.iter().enumerate() {
                row[k] = *init;
            }
        }
        for stage in &self.stages {
            for (k, tree) in stage.iter().enumerate() {
                for (r, row) in x.rows().into_iter().enumerate() {
                    scores[[r, k]] += self.learning_rate * tree.predict_row(row);
                }
            }
        }
        scores
    }
}

impl Classifier for GradientBoosting {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(Error::Shape("x and y row counts differ".into()));
        }
        self.n_classes = n_classes;

        // Log-prior initialization; every class must appear in training data.
        let mut priors = vec![0.0f32; n_classes];
        for &label in y {
            priors[label] += 1.0;
        }
        self.init_scores = priors
            .iter()
            .map(|&count| {
                let p = (count / n_samples as f32).max(1e-10);
                p.ln()
            })
            .collect();

        let mut raw = Array2::zeros((n_samples, n_classes));
        for mut row in raw.rows_mut() {
            for (k, init) in self.init_scores.iter().enumerate() {
                row[k] = *init;
            }
        }

        let all_indices: Vec<usize> = (0..n_samples).collect();
        self.stages = Vec::with_capacity(self.n_estimators);

        for _stage in 0..self.n_estimators {
            let mut proba = raw.clone();
            Self::softmax_rows(&mut proba);

            let mut stage_trees = Vec::with_capacity(n_classes);
            for k in 0..n_classes {
                let prob_k: Vec<f32> = (0..n_samples).map(|i| proba[[i, k]]).collect();
                let residual: Vec<f32> = (0..n_samples)
                    .map(|i| if y[i] == k { 1.0 } else { 0.0 } - prob_k[i])
                    .collect();

                let tree = GbmTree::fit(x, &residual, &prob_k, &all_indices, n_classes, self.max_depth)?;
                for (i, row) in x.rows().into_iter().enumerate() {
                    raw[[i, k]] += self.learning_rate * tree.predict_row(row);
                }
                stage_trees.push(tree);
            }
            self.stages.push(stage_trees);
        }
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if self.stages.is_empty() {
            return Err(Error::NotFitted);
        }
        let mut scores = self.raw_scores(x);
        Self::softmax_rows(&mut scores);
        Ok(scores)
    }

    fn name(&self) -> &str {
        "Gradient Boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{blobs, train_accuracy};

    #[test]
    fn fits_separable_blobs() {
        let (x, y) = blobs(3, 20, 7);
        let mut gbm = GradientBoosting::new(20, 0.1, 3);
        gbm.fit(&x, &y, 3).unwrap();
        assert!(train_accuracy(&gbm, &x, &y) > 0.95);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = blobs(2, 15, 7);
        let mut gbm = GradientBoosting::new(5, 0.1, 3);
        gbm.fit(&x, &y, 2).unwrap();
        let proba = gbm.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
        }
    }
}
