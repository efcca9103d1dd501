//! Benchmark runner: hold-out metrics plus cross-validation for every
//! classifier and the soft-voting ensemble.
use serde::{Deserialize, Serialize};

use crate::config::{ClassifierKind, EvaluationConfig};
use crate::data_handling::Dataset;
use crate::error::Result;
use crate::inference::TrainedModel;
use crate::labels::LabelCodec;
use crate::metrics;
use crate::model_selection::{stratified_train_test_split, StratifiedKFold};
use crate::models::{factory, Classifier};
use crate::preprocessing::StandardScaler;

/// One report row per evaluated classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub classifier: String,
    pub accuracy: f32,
    pub cv_mean: f32,
    pub cv_std: f32,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
}

/// Entry `kinds.len()` is the soft-voting ensemble; everything before it is
/// a base classifier in configuration order. A fresh instance per call.
fn build_entry(kinds: &[ClassifierKind], entry: usize, seed: u64) -> Box<dyn Classifier> {
    if entry < kinds.len() {
        factory::build(&kinds[entry], seed)
    } else {
        Box::new(factory::build_ensemble(seed))
    }
}

/// Run the full benchmark over the default classifier set.
///
/// The whole feature matrix is standardized once up front; the hold-out
/// split and every cross-validation fold reuse that scaling. Each entry gets
/// a freshly built classifier per fit, so no state leaks between folds.
pub fn evaluate_all(dataset: &Dataset, config: &EvaluationConfig) -> Result<Vec<MetricsRow>> {
    let kinds = ClassifierKind::base_set();
    let codec = LabelCodec::fit(&dataset.labels);
    let y = codec.encode_all(&dataset.labels)?;
    let n_classes = codec.n_classes();

    let scaler = StandardScaler::fit(&dataset.x)?;
    let scaled = scaler.transform(&dataset.x)?;

    let (train_idx, test_idx) =
        stratified_train_test_split(&y, f64::from(config.test_fraction), config.seed)?;
    let x_train = scaled.select(ndarray::Axis(0), &train_idx);
    let x_test = scaled.select(ndarray::Axis(0), &test_idx);
    let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();
    let y_test: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();

    let folds = StratifiedKFold::new(config.cv_folds, config.seed).split(&y)?;

    let n_entries = kinds.len() + 1;
    let mut rows = Vec::with_capacity(n_entries);
    for entry in 0..n_entries {
        let mut clf = build_entry(&kinds, entry, config.seed);
        let name = clf.name().to_string();
        log::info!("[Cultivar: eval] fitting {}", name);

        clf.fit(&x_train, &y_train, n_classes)?;
        let predicted = clf.predict(&x_test)?;

        let mut fold_scores = Vec::with_capacity(folds.len());
        for (fold_train, fold_test) in &folds {
            let fx_train = scaled.select(ndarray::Axis(0), fold_train);
            let fx_test = scaled.select(ndarray::Axis(0), fold_test);
            let fy_train: Vec<usize> = fold_train.iter().map(|&i| y[i]).collect();
            let fy_test: Vec<usize> = fold_test.iter().map(|&i| y[i]).collect();

            let mut fold_clf = build_entry(&kinds, entry, config.seed);
            fold_clf.fit(&fx_train, &fy_train, n_classes)?;
            let fold_pred = fold_clf.predict(&fx_test)?;
            fold_scores.push(metrics::accuracy(&fy_test, &fold_pred));
        }
        let cv_mean = fold_scores.iter().sum::<f32>() / fold_scores.len() as f32;
        let cv_std = (fold_scores
            .iter()
            .map(|s| (s - cv_mean) * (s - cv_mean))
            .sum::<f32>()
            / fold_scores.len() as f32)
            .sqrt();

        let row = MetricsRow {
            classifier: name,
            accuracy: metrics::accuracy(&y_test, &predicted),
            cv_mean,
            cv_std,
            precision: metrics::weighted_precision(&y_test, &predicted, n_classes),
            recall: metrics::weighted_recall(&y_test, &predicted, n_classes),
            f1: metrics::weighted_f1(&y_test, &predicted, n_classes),
        };
        log::info!(
            "[Cultivar: eval] {}: accuracy {:.4}, cv {:.4} +/- {:.4}",
            row.classifier,
            row.accuracy,
            row.cv_mean,
            row.cv_std
        );
        rows.push(row);
    }
    Ok(rows)
}

/// Train the serving model: scaler fit on the training split only, ensemble
/// fit on the scaled training rows.
pub fn train_serving_model(dataset: &Dataset, seed: u64) -> Result<TrainedModel> {
    let codec = LabelCodec::fit(&dataset.labels);
    let y = codec.encode_all(&dataset.labels)?;
    let n_classes = codec.n_classes();

    let (train_idx, _) = stratified_train_test_split(&y, 0.2, seed)?;
    let x_train_raw = dataset.select_rows(&train_idx);
    let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();

    let scaler = StandardScaler::fit(&x_train_raw)?;
    let x_train = scaler.transform(&x_train_raw)?;

    let mut ensemble = factory::build_ensemble(seed);
    ensemble.fit(&x_train, &y_train, n_classes)?;

    Ok(TrainedModel {
        scaler,
        codec,
        classifier: Box::new(ensemble),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::N_FEATURES;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn small_dataset() -> Dataset {
        let labels = ["chickpea", "maize", "rice"];
        let per_class = 15;
        let n = labels.len() * per_class;
        let mut rng = StdRng::seed_from_u64(99);
        let mut x = Array2::zeros((n, N_FEATURES));
        let mut names = Vec::with_capacity(n);
        for (class, label) in labels.iter().enumerate() {
            for i in 0..per_class {
                let row = class * per_class + i;
                for j in 0..N_FEATURES {
                    x[[row, j]] = class as f32 * 8.0 + rng.gen_range(-1.0..1.0);
                }
                names.push(label.to_string());
            }
        }
        Dataset::new(x, names).unwrap()
    }

    fn quick_config() -> EvaluationConfig {
        EvaluationConfig {
            seed: 42,
            test_fraction: 0.2,
            cv_folds: 3,
        }
    }

    #[test]
    fn produces_one_row_per_classifier_plus_ensemble() {
        let rows = evaluate_all(&small_dataset(), &quick_config()).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.classifier.as_str()).collect();
        assert_eq!(
            names,
            [
                "Random Forest",
                "Gradient Boosting",
                "AdaBoost",
                "Logistic Regression",
                "SVM",
                "Ensemble"
            ]
        );
        for row in &rows {
            assert!(row.accuracy >= 0.0 && row.accuracy <= 1.0);
            assert!(row.cv_mean >= 0.0 && row.cv_mean <= 1.0);
            assert!(row.cv_std >= 0.0);
            assert!(row.f1.is_finite());
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let dataset = small_dataset();
        let config = quick_config();
        let a = evaluate_all(&dataset, &config).unwrap();
        let b = evaluate_all(&dataset, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serving_model_predicts_a_known_label() {
        let dataset = small_dataset();
        let model = train_serving_model(&dataset, 42).unwrap();
        let features = crate::inference::CropFeatures {
            nitrogen: 8.0,
            phosphorus: 8.0,
            potassium: 8.0,
            temperature: 8.0,
            humidity: 8.0,
            ph: 8.0,
            rainfall: 8.0,
        };
        let prediction = model.predict(&features).unwrap();
        assert!(["chickpea", "maize", "rice"].contains(&prediction.predicted_crop.as_str()));
    }
}
