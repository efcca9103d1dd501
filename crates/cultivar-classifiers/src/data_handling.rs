//! Dataset container for the crop table.
//!
//! A `Dataset` owns the raw feature matrix (one row per sample, seven
//! soil/climate measurements per row) together with the raw label strings.
//! Rows are immutable once read; encoding and scaling happen downstream.
use std::collections::BTreeMap;

use ndarray::{Array2, Axis};

use crate::error::{Error, Result};

/// Feature columns in wire order.
pub const FEATURE_NAMES: [&str; 7] = [
    "N",
    "P",
    "K",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

/// Name of the label column in the input table.
pub const LABEL_COLUMN: &str = "label";

pub const N_FEATURES: usize = 7;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f32>,
    pub labels: Vec<String>,
}

impl Dataset {
    /// Build a dataset, validating the row/label invariants.
    pub fn new(x: Array2<f32>, labels: Vec<String>) -> Result<Self> {
        if x.ncols() != N_FEATURES {
            return Err(Error::Schema(format!(
                "expected {} feature columns, got {}",
                N_FEATURES,
                x.ncols()
            )));
        }
        if x.nrows() != labels.len() {
            return Err(Error::Shape(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                labels.len()
            )));
        }
        for (i, row) in x.rows().into_iter().enumerate() {
            if row.iter().any(|v| !v.is_finite()) {
                return Err(Error::Schema(format!(
                    "non-finite feature value in row {}",
                    i + 1
                )));
            }
        }
        if let Some(i) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(Error::Schema(format!("empty label in row {}", i + 1)));
        }
        Ok(Dataset { x, labels })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Row subset of the feature matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Array2<f32> {
        self.x.select(Axis(0), indices)
    }

    /// Per-label sample counts, in sorted label order.
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn log_summary(&self) {
        let counts = self.class_counts();
        log::info!(
            "Loaded {} samples across {} crop labels",
            self.n_samples(),
            counts.len()
        );
        for (label, count) in counts {
            log::debug!("  {:<12} {} samples", label, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn matrix(rows: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, N_FEATURES), |(r, c)| (r * 7 + c) as f32)
    }

    #[test]
    fn rejects_wrong_column_count() {
        let x = Array2::from_shape_vec((2, 3), vec![1.0; 6]).unwrap();
        let err = Dataset::new(x, vec!["rice".into(), "maize".into()]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut x = matrix(2);
        x[[1, 3]] = f32::NAN;
        let err = Dataset::new(x, vec!["rice".into(), "maize".into()]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn counts_classes_in_sorted_order() {
        let labels = vec!["rice".to_string(), "maize".to_string(), "rice".to_string()];
        let ds = Dataset::new(matrix(3), labels).unwrap();
        let counts: Vec<_> = ds.class_counts().into_iter().collect();
        assert_eq!(counts, vec![("maize", 1), ("rice", 2)]);
    }
}
