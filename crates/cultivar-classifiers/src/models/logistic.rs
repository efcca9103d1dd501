//! One-vs-rest logistic regression.
//!
//! One independent L2-regularized binary model per class, optimized by
//! batch gradient descent. Per-class sigmoid scores are normalized into a
//! probability vector.
use ndarray::{Array2, ArrayView1};

use crate::error::{Error, Result};
use crate::models::classifier::Classifier;

struct BinaryModel {
    coefficients: Vec<f32>,
    intercept: f32,
}

impl BinaryModel {
    fn decision(&self, row: ArrayView1<f32>) -> f32 {
        let mut z = self.intercept;
        for (w, v) in self.coefficients.iter().zip(row.iter()) {
            z += w * v;
        }
        z
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

pub struct OneVsRestLogistic {
    max_iter: usize,
    learning_rate: f32,
    c: f32,
    tol: f32,
    models: Vec<BinaryModel>,
}

impl OneVsRestLogistic {
    pub fn new(max_iter: usize, learning_rate: f32, c: f32) -> Self {
        OneVsRestLogistic {
            max_iter,
            learning_rate,
            c,
            tol: 1e-4,
            models: Vec::new(),
        }
    }

    /// Fit one binary model of class `target` against the rest.
    fn fit_binary(&self, x: &Array2<f32>, y: &[usize], target: usize) -> BinaryModel {
        let (n_samples, n_features) = x.dim();
        let n = n_samples as f32;
        // L2 strength 1/(C*n), matching the average-loss formulation.
        let lambda = 1.0 / (self.c * n);

        let mut model = BinaryModel {
            coefficients: vec![0.0; n_features],
            intercept: 0.0,
        };

        for _ in 0..self.max_iter {
            let mut coef_grad = vec![0.0f32; n_features];
            let mut intercept_grad = 0.0f32;

            for (i, row) in x.rows().into_iter().enumerate() {
                let label = if y[i] == target { 1.0 } else { 0.0 };
                let error = sigmoid(model.decision(row)) - label;
                intercept_grad += error;
                for (g, v) in coef_grad.iter_mut().zip(row.iter()) {
                    *g += error * v;
                }
            }

            intercept_grad /= n;
            for (g, w) in coef_grad.iter_mut().zip(model.coefficients.iter()) {
                *g = *g / n + lambda * w;
            }

            model.intercept -= self.learning_rate * intercept_grad;
            for (w, g) in model.coefficients.iter_mut().zip(coef_grad.iter()) {
                *w -= self.learning_rate * g;
            }

            if intercept_grad.abs() < self.tol && coef_grad.iter().all(|g| g.abs() < self.tol) {
                break;
            }
        }
        model
    }
}

impl Classifier for OneVsRestLogistic {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(Error::Shape("x and y row counts differ".into()));
        }
        self.models = (0..n_classes).map(|k| self.fit_binary(x, y, k)).collect();
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if self.models.is_empty() {
            return Err(Error::NotFitted);
        }
        let n_classes = self.models.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (r, row) in x.rows().into_iter().enumerate() {
            let mut sum = 0.0f32;
            for (k, model) in self.models.iter().enumerate() {
                let p = sigmoid(model.decision(row));
                proba[[r, k]] = p;
                sum += p;
            }
            if sum > 0.0 {
                for k in 0..n_classes {
                    proba[[r, k]] /= sum;
                }
            } else {
                for k in 0..n_classes {
                    proba[[r, k]] = 1.0 / n_classes as f32;
                }
            }
        }
        Ok(proba)
    }

    fn name(&self) -> &str {
        "Logistic Regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{blobs, train_accuracy};

    #[test]
    fn fits_separable_blobs() {
        let (x, y) = blobs(3, 20, 7);
        let mut lr = OneVsRestLogistic::new(500, 0.1, 1.0);
        lr.fit(&x, &y, 3).unwrap();
        assert!(train_accuracy(&lr, &x, &y) > 0.95);
    }

    #[test]
    fn probabilities_are_normalized() {
        let (x, y) = blobs(2, 10, 7);
        let mut lr = OneVsRestLogistic::new(100, 0.1, 1.0);
        lr.fit(&x, &y, 2).unwrap();
        let proba = lr.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }
}
