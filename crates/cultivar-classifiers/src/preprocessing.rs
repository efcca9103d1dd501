//! Per-column mean/std standardization.
//!
//! The scaler is fit once on training data and applied read-only everywhere
//! else; it must never see rows that are later used for evaluation.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum stddev below which a feature column counts as degenerate.
const MIN_STD: f32 = 1e-6;

/// Standard scaler (per-column mean and population standard deviation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl StandardScaler {
    /// Fit a scaler from a matrix where rows are samples and columns are
    /// features. A zero-variance column is an error, not a silent clamp.
    pub fn fit(x: &Array2<f32>) -> Result<Self> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 || ncols == 0 {
            return Err(Error::Shape("cannot fit a scaler on an empty matrix".into()));
        }

        let n = nrows as f32;
        let mut mean = vec![0.0f32; ncols];
        for row in x.rows() {
            for (c, v) in row.iter().enumerate() {
                mean[c] += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        let mut std = vec![0.0f32; ncols];
        for row in x.rows() {
            for (c, v) in row.iter().enumerate() {
                let d = v - mean[c];
                std[c] += d * d;
            }
        }
        for (c, s) in std.iter_mut().enumerate() {
            *s = (*s / n).sqrt();
            if *s < MIN_STD {
                return Err(Error::DegenerateFeature { column: c });
            }
        }

        Ok(StandardScaler { mean, std })
    }

    /// Transform all rows, returning a new matrix.
    pub fn transform(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let (nrows, ncols) = x.dim();
        if ncols != self.mean.len() {
            return Err(Error::Shape(format!(
                "scaler was fit on {} columns, input has {}",
                self.mean.len(),
                ncols
            )));
        }
        let mut out = Vec::with_capacity(nrows * ncols);
        for row in x.rows() {
            for (c, v) in row.iter().enumerate() {
                out.push((v - self.mean[c]) / self.std[c]);
            }
        }
        Array2::from_shape_vec((nrows, ncols), out)
            .map_err(|e| Error::Shape(e.to_string()))
    }

    /// Transform a single sample.
    pub fn transform_row(&self, row: &[f32]) -> Result<Vec<f32>> {
        if row.len() != self.mean.len() {
            return Err(Error::Shape(format!(
                "scaler was fit on {} columns, sample has {}",
                self.mean.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(c, v)| (v - self.mean[c]) / self.std[c])
            .collect())
    }

    /// Fit and transform in one call.
    pub fn fit_transform(x: &Array2<f32>) -> Result<(Self, Array2<f32>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }
}
