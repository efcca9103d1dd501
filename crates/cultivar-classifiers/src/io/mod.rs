//! Crop table CSV reader.
//!
//! Columns are resolved by name, so the file may carry them in any order.
//! Every row must provide all seven numeric features and a non-empty label;
//! a missing or unparseable field is a schema error, never a silent default.
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use ndarray::Array2;

use crate::data_handling::{Dataset, FEATURE_NAMES, LABEL_COLUMN, N_FEATURES};
use crate::error::Error;

/// Read a crop recommendation CSV into a [`Dataset`].
pub fn read_crop_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("Failed to open crop table: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read crop table header row")?
        .clone();

    let feature_indices = resolve_feature_indices(&headers)?;
    let label_idx = find_column(&headers, LABEL_COLUMN)
        .ok_or_else(|| Error::Schema(format!("missing column '{}'", LABEL_COLUMN)))?;

    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        for (&col, name) in feature_indices.iter().zip(FEATURE_NAMES.iter()) {
            let raw = record.get(col).ok_or_else(|| {
                Error::Schema(format!("row {} is missing field '{}'", row_idx + 1, name))
            })?;
            let value: f32 = raw.parse().map_err(|_| {
                Error::Schema(format!(
                    "row {}: field '{}' is not numeric: '{}'",
                    row_idx + 1,
                    name,
                    raw
                ))
            })?;
            features.push(value);
        }

        let label = record
            .get(label_idx)
            .ok_or_else(|| Error::Schema(format!("row {} is missing its label", row_idx + 1)))?;
        labels.push(label.to_string());
    }

    let n_rows = labels.len();
    let x = Array2::from_shape_vec((n_rows, N_FEATURES), features)
        .map_err(|e| Error::Shape(e.to_string()))?;

    let dataset = Dataset::new(x, labels)?;
    log::info!(
        "Read {} rows from {}",
        dataset.n_samples(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Column index of each named feature, in wire order.
fn resolve_feature_indices(headers: &StringRecord) -> Result<Vec<usize>> {
    FEATURE_NAMES
        .iter()
        .map(|name| {
            find_column(headers, name)
                .ok_or_else(|| Error::Schema(format!("missing column '{}'", name)).into())
        })
        .collect()
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}
