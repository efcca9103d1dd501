//! Single-sample prediction service.
//!
//! The service starts empty, fits once, and then serves predictions from an
//! immutable trained bundle (scaler, label codec, classifier). Requests are
//! validated before they touch the model.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::labels::LabelCodec;
use crate::models::Classifier;
use crate::preprocessing::StandardScaler;

/// One crop-recommendation request.
///
/// Field order matches the feature columns of the training table; unknown
/// or missing fields are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CropFeatures {
    pub nitrogen: f32,
    pub phosphorus: f32,
    pub potassium: f32,
    pub temperature: f32,
    pub humidity: f32,
    pub ph: f32,
    pub rainfall: f32,
}

impl CropFeatures {
    pub fn from_json(json: &str) -> Result<Self> {
        let features: CropFeatures =
            serde_json::from_str(json).map_err(|e| Error::InvalidInput(e.to_string()))?;
        features.validate()?;
        Ok(features)
    }

    /// Range checks on the physical quantities.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, f32, f32, f32); 7] = [
            ("nitrogen", self.nitrogen, 0.0, f32::INFINITY),
            ("phosphorus", self.phosphorus, 0.0, f32::INFINITY),
            ("potassium", self.potassium, 0.0, f32::INFINITY),
            ("temperature", self.temperature, -50.0, 60.0),
            ("humidity", self.humidity, 0.0, 100.0),
            ("ph", self.ph, 0.0, 14.0),
            ("rainfall", self.rainfall, 0.0, f32::INFINITY),
        ];
        for (name, value, lo, hi) in checks {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
            if value < lo || value > hi {
                return Err(Error::InvalidInput(format!(
                    "{name} = {value} is outside the valid range [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }

    /// Feature vector in training-column order.
    pub fn to_vec(&self) -> Vec<f32> {
        vec![
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_crop: String,
}

/// Immutable artifacts of one training run.
pub struct TrainedModel {
    pub scaler: StandardScaler,
    pub codec: LabelCodec,
    pub classifier: Box<dyn Classifier>,
}

impl TrainedModel {
    pub fn predict(&self, features: &CropFeatures) -> Result<Prediction> {
        features.validate()?;
        let scaled = self.scaler.transform_row(&features.to_vec())?;
        let n_cols = scaled.len();
        let x = Array2::from_shape_vec((1, n_cols), scaled)
            .map_err(|e| Error::Shape(e.to_string()))?;
        let class = self.classifier.predict(&x)?[0];
        Ok(Prediction {
            predicted_crop: self.codec.decode(class)?.to_string(),
        })
    }
}

/// Prediction service with an explicit lifecycle: it is created empty,
/// becomes ready exactly once, and never returns to the empty state.
#[derive(Default)]
pub struct InferenceService {
    model: Option<TrainedModel>,
}

impl InferenceService {
    pub fn new() -> Self {
        InferenceService { model: None }
    }

    /// Install a trained model, making the service ready.
    pub fn ready(&mut self, model: TrainedModel) {
        log::info!(
            "[Cultivar: inference] service ready with {} classifier, {} crop labels",
            model.classifier.name(),
            model.codec.n_classes()
        );
        self.model = Some(model);
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict(&self, features: &CropFeatures) -> Result<Prediction> {
        let model = self.model.as_ref().ok_or(Error::NotFitted)?;
        model.predict(features)
    }

    pub fn predict_json(&self, json: &str) -> Result<Prediction> {
        self.predict(&CropFeatures::from_json(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CropFeatures {
        CropFeatures {
            nitrogen: 90.0,
            phosphorus: 42.0,
            potassium: 43.0,
            temperature: 20.8,
            humidity: 82.0,
            ph: 6.5,
            rainfall: 202.9,
        }
    }

    #[test]
    fn service_starts_not_ready() {
        let service = InferenceService::new();
        assert!(!service.is_ready());
        assert!(matches!(service.predict(&sample()), Err(Error::NotFitted)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut f = sample();
        f.humidity = 130.0;
        assert!(matches!(f.validate(), Err(Error::InvalidInput(_))));
        f = sample();
        f.ph = -0.5;
        assert!(matches!(f.validate(), Err(Error::InvalidInput(_))));
        f = sample();
        f.temperature = f32::NAN;
        assert!(matches!(f.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn accepts_the_wire_field_names() {
        let json = r#"{"nitrogen":90,"phosphorus":42,"potassium":43,"temperature":20.8,"humidity":82.0,"ph":6.5,"rainfall":202.9}"#;
        let features = CropFeatures::from_json(json).unwrap();
        assert_eq!(features, sample());
    }

    #[test]
    fn rejects_missing_and_unknown_fields() {
        let missing = r#"{"nitrogen":90,"phosphorus":42,"potassium":43,"temperature":20.8,"humidity":82,"ph":6.5}"#;
        assert!(matches!(
            CropFeatures::from_json(missing),
            Err(Error::InvalidInput(_))
        ));
        let extra = r#"{"nitrogen":90,"phosphorus":42,"potassium":43,"temperature":20.8,"humidity":82,"ph":6.5,"rainfall":202.9,"soil":"loam"}"#;
        assert!(matches!(
            CropFeatures::from_json(extra),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn vector_order_matches_feature_columns() {
        let v = sample().to_vec();
        assert_eq!(v, vec![90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9]);
    }
}
