//! End-to-end coverage: CSV in, benchmark out, trained service predicting.
use std::io::Write;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cultivar_classifiers::config::EvaluationConfig;
use cultivar_classifiers::data_handling::{Dataset, N_FEATURES};
use cultivar_classifiers::error::Error;
use cultivar_classifiers::evaluation::{evaluate_all, train_serving_model};
use cultivar_classifiers::inference::{CropFeatures, InferenceService};
use cultivar_classifiers::io::read_crop_csv;
use cultivar_classifiers::preprocessing::StandardScaler;
use cultivar_classifiers::report::{write_metrics_csv, REPORT_HEADERS};

/// Three crops with well-separated feature ranges, ten samples each.
fn synthetic_dataset() -> Dataset {
    let crops = ["chickpea", "maize", "rice"];
    let per_class = 10;
    let mut rng = StdRng::seed_from_u64(7);
    let n = crops.len() * per_class;
    let mut x = Array2::zeros((n, N_FEATURES));
    let mut labels = Vec::with_capacity(n);
    for (class, crop) in crops.iter().enumerate() {
        for i in 0..per_class {
            let row = class * per_class + i;
            for j in 0..N_FEATURES {
                x[[row, j]] = 10.0 + class as f32 * 20.0 + rng.gen_range(-2.0..2.0);
            }
            labels.push(crop.to_string());
        }
    }
    Dataset::new(x, labels).unwrap()
}

fn write_csv(dataset: &Dataset, shuffle_columns: bool) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    if shuffle_columns {
        writeln!(file, "label,rainfall,ph,humidity,temperature,K,P,N").unwrap();
        for (row, label) in dataset.x.rows().into_iter().zip(dataset.labels.iter()) {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                label, row[6], row[5], row[4], row[3], row[2], row[1], row[0]
            )
            .unwrap();
        }
    } else {
        writeln!(file, "N,P,K,temperature,humidity,ph,rainfall,label").unwrap();
        for (row, label) in dataset.x.rows().into_iter().zip(dataset.labels.iter()) {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                row[0], row[1], row[2], row[3], row[4], row[5], row[6], label
            )
            .unwrap();
        }
    }
    file.flush().unwrap();
    file
}

#[test]
fn csv_reader_accepts_any_column_order() {
    let dataset = synthetic_dataset();
    let plain = write_csv(&dataset, false);
    let shuffled = write_csv(&dataset, true);

    let a = read_crop_csv(plain.path()).unwrap();
    let b = read_crop_csv(shuffled.path()).unwrap();
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.x, b.x);
}

#[test]
fn csv_reader_rejects_missing_feature_column() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "N,P,K,temperature,humidity,ph,label").unwrap();
    writeln!(file, "90,42,43,20.8,82,6.5,rice").unwrap();
    file.flush().unwrap();

    let err = read_crop_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("rainfall"));
}

#[test]
fn csv_reader_rejects_non_numeric_field() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "N,P,K,temperature,humidity,ph,rainfall,label").unwrap();
    writeln!(file, "90,42,43,warm,82,6.5,202.9,rice").unwrap();
    file.flush().unwrap();

    let err = read_crop_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("temperature"));
}

#[test]
fn benchmark_report_round_trips_through_csv() {
    let dataset = synthetic_dataset();
    let config = EvaluationConfig {
        seed: 42,
        test_fraction: 0.2,
        cv_folds: 3,
    };
    let rows = evaluate_all(&dataset, &config).unwrap();
    assert_eq!(rows.len(), 6);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.csv");
    write_metrics_csv(&path, &rows).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, REPORT_HEADERS);
    assert_eq!(reader.records().count(), 6);
}

#[test]
fn trained_service_predicts_the_matching_crop() {
    let dataset = synthetic_dataset();
    let model = train_serving_model(&dataset, 42).unwrap();
    let mut service = InferenceService::new();
    assert!(!service.is_ready());
    service.ready(model);
    assert!(service.is_ready());

    // A sample deep inside the "rice" cluster (class 2, centered at 50).
    let prediction = service
        .predict_json(
            r#"{"nitrogen":50,"phosphorus":50,"potassium":50,"temperature":50,"humidity":50,"ph":7,"rainfall":50}"#,
        )
        .unwrap();
    assert_eq!(prediction.predicted_crop, "rice");
}

#[test]
fn service_reports_invalid_requests() {
    let dataset = synthetic_dataset();
    let model = train_serving_model(&dataset, 42).unwrap();
    let mut service = InferenceService::new();
    service.ready(model);

    let missing_rainfall =
        r#"{"nitrogen":50,"phosphorus":50,"potassium":50,"temperature":25,"humidity":50,"ph":7}"#;
    assert!(matches!(
        service.predict_json(missing_rainfall),
        Err(Error::InvalidInput(_))
    ));

    let negative_nitrogen =
        r#"{"nitrogen":-1,"phosphorus":50,"potassium":50,"temperature":25,"humidity":50,"ph":7,"rainfall":50}"#;
    assert!(matches!(
        service.predict_json(negative_nitrogen),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn constant_feature_column_fails_training() {
    let mut dataset = synthetic_dataset();
    for mut row in dataset.x.rows_mut() {
        row[3] = 25.0;
    }
    match StandardScaler::fit(&dataset.x) {
        Err(Error::DegenerateFeature { column }) => assert_eq!(column, 3),
        other => panic!("expected DegenerateFeature, got {:?}", other),
    }
    assert!(matches!(
        train_serving_model(&dataset, 42),
        Err(Error::DegenerateFeature { column: 3 })
    ));
}
