//! Stratified splitting utilities.
//!
//! Both the hold-out split and the K-fold iterator group samples by class,
//! shuffle each group with the run seed, and distribute them so every
//! partition keeps the class proportions within one sample.
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Error, Result};

/// Sample indices grouped by class, each group shuffled deterministically.
fn shuffled_class_groups(y: &[usize], seed: u64) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        groups.entry(label).or_default().push(i);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    groups
        .into_values()
        .map(|mut indices| {
            indices.shuffle(&mut rng);
            indices
        })
        .collect()
}

/// Stratified hold-out split. Returns `(train_indices, test_indices)`.
///
/// Each class contributes `round(len * test_fraction)` samples to the test
/// set, so per-class proportions are preserved within one sample.
pub fn stratified_train_test_split(
    y: &[usize],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(Error::Shape(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    if y.is_empty() {
        return Err(Error::Shape("cannot split an empty dataset".into()));
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for group in shuffled_class_groups(y, seed) {
        let n_test = ((group.len() as f64 * test_fraction).round() as usize)
            .min(group.len().saturating_sub(1))
            .max(1);
        test.extend_from_slice(&group[..n_test]);
        train.extend_from_slice(&group[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Stratified K-fold cross-validation splitter.
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        StratifiedKFold { n_splits, seed }
    }

    /// Produce `(train_indices, test_indices)` for each fold.
    ///
    /// Every class needs at least `n_splits` members.
    pub fn split(&self, y: &[usize]) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(Error::Shape(format!(
                "n_splits must be at least 2, got {}",
                self.n_splits
            )));
        }

        let groups = shuffled_class_groups(y, self.seed);
        for group in &groups {
            if group.len() < self.n_splits {
                return Err(Error::Shape(format!(
                    "a class has {} samples but {} folds were requested",
                    group.len(),
                    self.n_splits
                )));
            }
        }

        // Deal each shuffled class group across folds round-robin style,
        // with the first `len % n_splits` folds taking one extra sample.
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for group in &groups {
            let base = group.len() / self.n_splits;
            let extra = group.len() % self.n_splits;
            let mut offset = 0;
            for (f, fold) in folds.iter_mut().enumerate() {
                let take = base + usize::from(f < extra);
                fold.extend_from_slice(&group[offset..offset + take]);
                offset += take;
            }
        }

        let splits = folds
            .iter()
            .enumerate()
            .map(|(f, fold)| {
                let mut test = fold.clone();
                test.sort_unstable();
                let mut train: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != f)
                    .flat_map(|(_, v)| v.iter().copied())
                    .collect();
                train.sort_unstable();
                (train, test)
            })
            .collect();
        Ok(splits)
    }
}
