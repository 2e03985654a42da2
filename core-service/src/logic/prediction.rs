//! Prediction Service - CarAttributes → predicted price
//!
//! Encoder and inference adapter composed into the single operation the
//! request layer calls. Holds no per-request state; share it behind `Arc`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logic::features::{encode_with_report, CarAttributes, EncodingReport};
use crate::logic::model::{infer, EngineStatus, InferenceEngine, InferenceError};

/// Prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f32,
}

/// Failure of a single prediction. Request-scoped; no shared state is touched.
///
/// Encoding is total, so only the engine can fail a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),
}

#[derive(Clone)]
pub struct PredictionService {
    engine: Arc<dyn InferenceEngine>,
}

impl PredictionService {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    pub fn predict(&self, input: &CarAttributes) -> Result<PredictionResult, PredictionError> {
        self.predict_detailed(input).map(|(result, _)| result)
    }

    /// Predict and also return which categorical values were dropped
    pub fn predict_detailed(
        &self,
        input: &CarAttributes,
    ) -> Result<(PredictionResult, EncodingReport), PredictionError> {
        let (features, report) = encode_with_report(input);
        let predicted_price = infer(self.engine.as_ref(), &features)?;

        Ok((PredictionResult { predicted_price }, report))
    }

    pub fn status(&self) -> EngineStatus {
        crate::logic::model::inference::get_status(self.engine.as_ref())
    }
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("engine", &self.engine.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;
    use ndarray::Array2;
    use parking_lot::Mutex;

    /// Echoes a price derived from the input so tests can see what was sent
    #[derive(Default)]
    struct RecordingEngine {
        last_input: Mutex<Option<Vec<f32>>>,
    }

    impl InferenceEngine for RecordingEngine {
        fn run(&self, input: Array2<f32>) -> Result<Vec<f32>, InferenceError> {
            let values = input.iter().copied().collect::<Vec<_>>();
            let horsepower = values[10];
            *self.last_input.lock() = Some(values);
            Ok(vec![horsepower * 100.0])
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingEngine;

    impl InferenceEngine for FailingEngine {
        fn run(&self, _input: Array2<f32>) -> Result<Vec<f32>, InferenceError> {
            Err(InferenceError::SessionConstruction("model missing".to_string()))
        }
    }

    fn sample() -> CarAttributes {
        crate::logic::features::tests::sample_record()
    }

    #[test]
    fn test_predict_sends_encoded_vector() {
        let engine = Arc::new(RecordingEngine::default());
        let service = PredictionService::new(engine.clone());

        let result = service.predict(&sample()).unwrap();
        assert_eq!(result.predicted_price, 11000.0);

        let sent = engine.last_input.lock().clone().unwrap();
        assert_eq!(sent.len(), FEATURE_COUNT);
        assert_eq!(sent, crate::logic::features::encode(&sample()).as_slice());
    }

    #[test]
    fn test_predict_detailed_reports_unmatched() {
        let service = PredictionService::new(Arc::new(RecordingEngine::default()));
        let mut input = sample();
        input.brand = "invalid_brand_xyz".to_string();

        let (result, report) = service.predict_detailed(&input).unwrap();
        assert_eq!(result.predicted_price, 11000.0);
        assert_eq!(report.fields(), vec!["brand"]);
    }

    #[test]
    fn test_engine_failure_surfaces_as_inference_error() {
        let service = PredictionService::new(Arc::new(FailingEngine));
        let err = service.predict(&sample()).unwrap_err();

        assert!(matches!(
            err,
            PredictionError::Inference(InferenceError::SessionConstruction(_))
        ));
        assert!(err.to_string().starts_with("inference error"));
    }

    #[test]
    fn test_result_serializes_like_api() {
        let json = serde_json::to_value(PredictionResult { predicted_price: 15000.0 }).unwrap();
        assert_eq!(json, serde_json::json!({ "predicted_price": 15000.0 }));
    }

    #[test]
    fn test_debug_names_engine() {
        let service = PredictionService::new(Arc::new(RecordingEngine::default()));
        assert!(format!("{:?}", service).contains("recording"));
        assert_eq!(service.status().engine, "recording");
    }
}
