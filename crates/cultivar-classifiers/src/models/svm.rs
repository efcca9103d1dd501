//! RBF-kernel support vector machine with probability calibration.
//!
//! One-vs-rest binary machines trained with the kernelized Pegasos update,
//! each followed by a Platt sigmoid fit on the training decision values so
//! the ensemble can vote on probabilities. The model standardizes its input
//! with its own scaler before touching the kernel; callers that already
//! standardized their matrix get standardized twice, which is harmless for
//! the kernel geometry and keeps gamma scaling stable.
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::models::classifier::Classifier;
use crate::preprocessing::StandardScaler;

/// Pegasos passes over the training set per binary machine.
const EPOCHS: usize = 30;
/// Iterations for the Platt sigmoid fit.
const PLATT_ITERS: usize = 200;

struct BinaryMachine {
    /// Signed dual weights, `alpha_i * y_i / (lambda * t)` folded in.
    dual: Vec<f32>,
    /// Platt sigmoid: p = 1 / (1 + exp(a * f + b)).
    platt_a: f32,
    platt_b: f32,
}

pub struct RbfSvm {
    c: f32,
    seed: u64,
    scaler: Option<StandardScaler>,
    gamma: f32,
    support: Array2<f32>,
    machines: Vec<BinaryMachine>,
}

impl RbfSvm {
    pub fn new(c: f32, seed: u64) -> Self {
        RbfSvm {
            c,
            seed,
            scaler: None,
            gamma: 0.0,
            support: Array2::zeros((0, 0)),
            machines: Vec::new(),
        }
    }

    fn kernel(&self, a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
        let mut dist = 0.0f32;
        for (&u, &v) in a.iter().zip(b.iter()) {
            let d = u - v;
            dist += d * d;
        }
        (-self.gamma * dist).exp()
    }

    /// `gamma = 1 / (n_features * var(x))`, the "scale" heuristic.
    fn scale_gamma(x: &Array2<f32>) -> f32 {
        let n = (x.nrows() * x.ncols()) as f32;
        let mean = x.iter().sum::<f32>() / n;
        let var = x.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / n;
        if var > 0.0 {
            1.0 / (x.ncols() as f32 * var)
        } else {
            1.0 / x.ncols() as f32
        }
    }

    fn decision(&self, machine: &BinaryMachine, row: ArrayView1<f32>) -> f32 {
        let mut f = 0.0f32;
        for (i, sv) in self.support.rows().into_iter().enumerate() {
            let w = machine.dual[i];
            if w != 0.0 {
                f += w * self.kernel(sv, row);
            }
        }
        f
    }

    /// Kernelized Pegasos on the precomputed kernel matrix.
    fn train_binary(
        &self,
        kernel: &Array2<f32>,
        targets: &[f32],
        rng: &mut StdRng,
    ) -> Vec<f32> {
        let n = targets.len();
        let lambda = 1.0 / (self.c * n as f32);
        let mut alpha = vec![0.0f32; n];
        let mut t = 0usize;

        for _ in 0..EPOCHS {
            for _ in 0..n {
                t += 1;
                let i = rng.gen_range(0..n);
                let scale = 1.0 / (lambda * t as f32);
                let mut margin = 0.0f32;
                for (j, &a) in alpha.iter().enumerate() {
                    if a != 0.0 {
                        margin += a * targets[j] * kernel[[j, i]];
                    }
                }
                if targets[i] * scale * margin < 1.0 {
                    alpha[i] += 1.0;
                }
            }
        }

        let scale = 1.0 / (lambda * t as f32);
        alpha
            .iter()
            .zip(targets.iter())
            .map(|(&a, &y)| a * y * scale)
            .collect()
    }

    /// Platt scaling: fit `p = 1 / (1 + exp(a*f + b))` by gradient descent on
    /// the cross-entropy against smoothed targets.
    fn fit_platt(decisions: &[f32], targets: &[f32]) -> (f32, f32) {
        let n_pos = targets.iter().filter(|&&y| y > 0.0).count() as f32;
        let n_neg = targets.len() as f32 - n_pos;
        let t_pos = (n_pos + 1.0) / (n_pos + 2.0);
        let t_neg = 1.0 / (n_neg + 2.0);

        let mut a = -1.0f32;
        let mut b = 0.0f32;
        let lr = 0.01f32;
        let n = decisions.len() as f32;

        for _ in 0..PLATT_ITERS {
            let mut grad_a = 0.0f32;
            let mut grad_b = 0.0f32;
            for (&f, &y) in decisions.iter().zip(targets.iter()) {
                let target = if y > 0.0 { t_pos } else { t_neg };
                let p = 1.0 / (1.0 + (a * f + b).exp());
                // d(loss)/d(a*f+b) = target - p for this parameterization.
                let err = target - p;
                grad_a += err * f;
                grad_b += err;
            }
            a -= lr * grad_a / n;
            b -= lr * grad_b / n;
        }
        (a, b)
    }
}

impl Classifier for RbfSvm {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(Error::Shape("x and y row counts differ".into()));
        }

        let scaler = StandardScaler::fit(x)?;
        let scaled = scaler.transform(x)?;
        self.gamma = Self::scale_gamma(&scaled);

        // Precompute the train kernel once; all OvR machines share it.
        let mut kernel = Array2::zeros((n_samples, n_samples));
        for i in 0..n_samples {
            for j in i..n_samples {
                let k = self.kernel(scaled.row(i), scaled.row(j));
                kernel[[i, j]] = k;
                kernel[[j, i]] = k;
            }
        }

        let mut machines = Vec::with_capacity(n_classes);
        for class in 0..n_classes {
            let targets: Vec<f32> = y
                .iter()
                .map(|&label| if label == class { 1.0 } else { -1.0 })
                .collect();
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(class as u64));
            let dual = self.train_binary(&kernel, &targets, &mut rng);

            let decisions: Vec<f32> = (0..n_samples)
                .map(|i| {
                    let mut f = 0.0f32;
                    for (j, &w) in dual.iter().enumerate() {
                        if w != 0.0 {
                            f += w * kernel[[j, i]];
                        }
                    }
                    f
                })
                .collect();
            let (platt_a, platt_b) = Self::fit_platt(&decisions, &targets);
            machines.push(BinaryMachine {
                dual,
                platt_a,
                platt_b,
            });
        }

        self.scaler = Some(scaler);
        self.support = scaled;
        self.machines = machines;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let scaler = self.scaler.as_ref().ok_or(Error::NotFitted)?;
        let scaled = scaler.transform(x)?;
        let n_classes = self.machines.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));

        for (r, row) in scaled.rows().into_iter().enumerate() {
            let mut sum = 0.0f32;
            for (k, machine) in self.machines.iter().enumerate() {
                let f = self.decision(machine, row);
                let p = 1.0 / (1.0 + (machine.platt_a * f + machine.platt_b).exp());
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
        "SVM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{blobs, train_accuracy};

    #[test]
    fn fits_separable_blobs() {
        let (x, y) = blobs(3, 15, 7);
        let mut svm = RbfSvm::new(1.0, 42);
        svm.fit(&x, &y, 3).unwrap();
        assert!(train_accuracy(&svm, &x, &y) > 0.9);
    }

    #[test]
    fn probabilities_are_normalized() {
        let (x, y) = blobs(2, 12, 7);
        let mut svm = RbfSvm::new(1.0, 3);
        svm.fit(&x, &y, 2).unwrap();
        let proba = svm.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn same_seed_reproduces_probabilities() {
        let (x, y) = blobs(2, 10, 7);
        let mut a = RbfSvm::new(1.0, 9);
        let mut b = RbfSvm::new(1.0, 9);
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }
}
