//! Random forest classifier.
//!
//! Trees are grown on bootstrap samples with sqrt-feature subsampling per
//! split. Each tree derives its own seed from the run seed, so fits are
//! reproducible whether they run sequentially or across the rayon pool.
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::models::classifier::Classifier;
use crate::models::tree::{ClassificationTree, TreeParams};

pub struct RandomForest {
    n_estimators: usize,
    max_depth: Option<usize>,
    seed: u64,
    trees: Vec<ClassificationTree>,
    n_classes: usize,
}

impl RandomForest {
    pub fn new(n_estimators: usize, max_depth: Option<usize>, seed: u64) -> Self {
        RandomForest {
            n_estimators,
            max_depth,
            seed,
            trees: Vec::new(),
            n_classes: 0,
        }
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(Error::Shape("x and y row counts differ".into()));
        }
        let n_features = x.ncols();
        let max_features = ((n_features as f64).sqrt().floor() as usize).max(1);
        let weights = vec![1.0f32; n_samples];
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: 2,
            max_features: Some(max_features),
        };

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let bootstrap: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                ClassificationTree::fit(x, y, &weights, &bootstrap, n_classes, &params, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if self.trees.is_empty() {
            return Err(Error::NotFitted);
        }
        let n_samples = x.nrows();
        let mut proba = Array2::zeros((n_samples, self.n_classes));
        for (r, row) in x.rows().into_iter().enumerate() {
            for tree in &self.trees {
                for (c, p) in tree.predict_distribution(row).iter().enumerate() {
                    proba[[r, c]] += p;
                }
            }
        }
        proba.mapv_inplace(|v| v / self.trees.len() as f32);
        Ok(proba)
    }

    fn name(&self) -> &str {
        "Random Forest"
    }
}
