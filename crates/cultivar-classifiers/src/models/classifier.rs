use ndarray::{Array2, ArrayView1};

use crate::error::Result;

/// Capability contract shared by every base learner and by the ensemble.
///
/// A classifier is fit once on an encoded, scaled training matrix and is
/// read-only afterwards: `predict`/`predict_proba` take `&self` so a trained
/// model can be shared across threads without locking.
pub trait Classifier: Send + Sync {
    /// Fit the model on `x` (n_samples x n_features) with dense class
    /// indices `y` in `0..n_classes`.
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) -> Result<()>;

    /// Per-class probability matrix (n_samples x n_classes); each row sums
    /// to 1 within floating tolerance.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>>;

    /// Arg-max class per row, ties broken by lowest class index.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(argmax_rows(&proba))
    }

    /// Human readable name for reports and logs.
    fn name(&self) -> &str;
}

/// Index of the row maximum; the first maximum wins, so ties resolve to the
/// lowest class index.
pub fn argmax_row(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &v) in row.iter().enumerate() {
        if v > best_value {
            best_value = v;
            best = i;
        }
    }
    best
}

pub fn argmax_rows(proba: &Array2<f32>) -> Vec<usize> {
    proba.rows().into_iter().map(argmax_row).collect()
}
